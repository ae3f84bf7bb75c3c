//! Reply selection for one visitor message.

use tracing::debug;

use super::intent::{is_negative, is_positive};
use super::knowledge::KnowledgeBase;
use super::script::{ADMISSIONS, Script};
use crate::protocol::ChatReply;
use crate::session::{DialogueState, VisitorStore};

/// Phrases asking to expand on the previous answer.
const MORE_PHRASES: &[&str] = &["tell me more", "details", "aur jaankari"];

/// Chooses replies for visitors and tracks their progress.
#[derive(Debug, Clone)]
pub struct DialogueEngine {
    knowledge: KnowledgeBase,
    script: Script,
    visitors: VisitorStore,
}

impl DialogueEngine {
    /// Engine running the admissions script.
    #[must_use]
    pub fn new(knowledge: KnowledgeBase, visitors: VisitorStore) -> Self {
        Self::with_script(knowledge, ADMISSIONS, visitors)
    }

    #[must_use]
    pub fn with_script(knowledge: KnowledgeBase, script: Script, visitors: VisitorStore) -> Self {
        Self {
            knowledge,
            script,
            visitors,
        }
    }

    #[must_use]
    pub fn visitors(&self) -> &VisitorStore {
        &self.visitors
    }

    #[must_use]
    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Reply to `message` from `visitor_id`.
    ///
    /// An empty message restarts the visitor's dialogue.
    pub fn reply(&self, visitor_id: &str, message: &str) -> ChatReply {
        let visitor = self.visitors.get_or_create(visitor_id);
        visitor.with_state(|state| {
            let reply = self.next(state, message);
            debug!(
                name: "dialogue.step",
                visitor = %visitor_id,
                step = state.step,
                end = reply.end,
                "Dialogue advanced"
            );
            reply
        })
    }

    fn next(&self, state: &mut DialogueState, message: &str) -> ChatReply {
        let norm = message.trim().to_lowercase();

        if norm.is_empty() {
            state.reset();
            return self.ask(state, 1);
        }

        if MORE_PHRASES.iter().any(|p| norm.contains(p)) {
            return match &state.last_answer {
                Some(answer) => ChatReply::open(format!("{answer}{}", self.script.follow_up)),
                None => ChatReply::open(self.script.help),
            };
        }

        if let Some(answer) = self.knowledge.search(&norm) {
            state.last_answer = Some(answer.to_string());
            return ChatReply::open(answer);
        }

        if is_negative(message) {
            state.reset();
            return ChatReply::closing(self.script.refusal);
        }

        if state.step == 0 {
            return self.ask(state, 1);
        }

        let Some(question) = self.script.question(state.step).copied() else {
            state.reset();
            return ChatReply::open(self.script.confused);
        };

        let accepted = is_positive(message)
            || question.also_accepts.is_some_and(|word| norm.contains(word));
        if !accepted {
            state.reset();
            return ChatReply::closing(question.decline);
        }

        if state.step == self.script.last_step() {
            state.reset();
            return ChatReply::closing(self.script.closing);
        }

        let next = state.step + 1;
        self.ask(state, next)
    }

    fn ask(&self, state: &mut DialogueState, step: usize) -> ChatReply {
        match self.script.question(step) {
            Some(question) => {
                state.step = step;
                ChatReply::open(question.prompt)
            }
            None => {
                state.reset();
                ChatReply::open(self.script.confused)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::knowledge::{DEFAULT_CUTOFF, KnowledgeEntry};

    fn engine() -> DialogueEngine {
        DialogueEngine::new(KnowledgeBase::default(), VisitorStore::new())
    }

    fn engine_with_kb() -> DialogueEngine {
        let kb = KnowledgeBase::new(
            vec![KnowledgeEntry {
                question: "hostel facility".to_string(),
                answer: "Hostel mein warden hamesha rehte hain.".to_string(),
            }],
            DEFAULT_CUTOFF,
        );
        DialogueEngine::new(kb, VisitorStore::new())
    }

    #[test]
    fn test_start_greets_and_sets_step() {
        let engine = engine();
        let reply = engine.reply("v", "");
        assert_eq!(reply, ChatReply::open(ADMISSIONS.questions[0].prompt));
        assert_eq!(engine.visitors().get("v").unwrap().state().step, 1);
    }

    #[test]
    fn test_positive_answers_walk_the_script() {
        let engine = engine();
        engine.reply("v", "");
        for step in 2..=12 {
            let reply = engine.reply("v", "haan");
            assert_eq!(reply, ChatReply::open(ADMISSIONS.questions[step - 1].prompt));
        }
        let last = engine.reply("v", "ok");
        assert_eq!(last, ChatReply::closing(ADMISSIONS.closing));
        assert_eq!(engine.visitors().get("v").unwrap().state().step, 0);
    }

    #[test]
    fn test_biology_keyword_counts_as_yes() {
        let engine = engine();
        engine.reply("v", "");
        engine.reply("v", "yes");
        let reply = engine.reply("v", "12th mein Biology thi");
        assert_eq!(reply, ChatReply::open(ADMISSIONS.questions[2].prompt));
    }

    #[test]
    fn test_unclear_answer_declines_and_ends() {
        let engine = engine();
        engine.reply("v", "");
        engine.reply("v", "yes");
        let reply = engine.reply("v", "pata nahi kya");
        // "nahi" is a refusal word, so the generic refusal wins.
        assert_eq!(reply, ChatReply::closing(ADMISSIONS.refusal));

        engine.reply("v", "");
        engine.reply("v", "yes");
        let reply = engine.reply("v", "commerce liya tha");
        assert_eq!(reply, ChatReply::closing(ADMISSIONS.questions[1].decline));
        assert_eq!(engine.visitors().get("v").unwrap().state().step, 0);
    }

    #[test]
    fn test_negative_ends_conversation() {
        let engine = engine();
        engine.reply("v", "");
        let reply = engine.reply("v", "No thanks");
        assert!(reply.end);
        assert_eq!(reply.reply, ADMISSIONS.refusal);
    }

    #[test]
    fn test_first_message_without_start_greets() {
        let engine = engine();
        let reply = engine.reply("v", "hello");
        assert_eq!(reply, ChatReply::open(ADMISSIONS.questions[0].prompt));
    }

    #[test]
    fn test_empty_message_restarts_mid_dialogue() {
        let engine = engine();
        engine.reply("v", "");
        engine.reply("v", "yes");
        engine.reply("v", "yes");
        let reply = engine.reply("v", "");
        assert_eq!(reply, ChatReply::open(ADMISSIONS.questions[0].prompt));
        assert_eq!(engine.visitors().get("v").unwrap().state().step, 1);
    }

    #[test]
    fn test_knowledge_answer_and_tell_me_more() {
        let engine = engine_with_kb();
        engine.reply("v", "");

        let reply = engine.reply("v", "Hostel facility?");
        assert_eq!(reply, ChatReply::open("Hostel mein warden hamesha rehte hain."));

        let more = engine.reply("v", "tell me more");
        assert!(!more.end);
        assert!(more.reply.starts_with("Hostel mein warden hamesha rehte hain.\n"));
        assert!(more.reply.ends_with(ADMISSIONS.follow_up.trim_start()));
    }

    #[test]
    fn test_tell_me_more_without_answer_offers_help() {
        let engine = engine();
        assert_eq!(engine.reply("v", "details please"), ChatReply::open(ADMISSIONS.help));
    }

    #[test]
    fn test_visitors_are_independent() {
        let engine = engine();
        engine.reply("a", "");
        engine.reply("a", "yes");
        let reply = engine.reply("b", "");
        assert_eq!(reply.reply, ADMISSIONS.questions[0].prompt);
        assert_eq!(engine.visitors().get("a").unwrap().state().step, 2);
    }
}

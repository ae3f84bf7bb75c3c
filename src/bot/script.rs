//! The scripted admissions dialogue.
//!
//! A script is a fixed sequence of yes/no questions. Entering step `n` asks
//! question `n - 1`; a positive answer moves on, anything else ends the
//! conversation with that question's decline text.

/// One question in the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    /// Text sent when the question is asked.
    pub prompt: &'static str,
    /// Extra keyword accepted as a yes besides the positive vocabulary.
    pub also_accepts: Option<&'static str>,
    /// Reply when the answer is not a yes.
    pub decline: &'static str,
}

/// A linear yes/no dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Script {
    pub questions: &'static [Question],
    /// Reply after the last question is answered with a yes.
    pub closing: &'static str,
    /// Reply when the visitor refuses outright.
    pub refusal: &'static str,
    /// Reply to "tell me more" when there is nothing to expand on.
    pub help: &'static str,
    /// Appended when repeating a knowledge-base answer.
    pub follow_up: &'static str,
    /// Reply when the visitor's step is outside the script.
    pub confused: &'static str,
}

impl Script {
    /// Question asked on entering `step`, if the step is in the script.
    #[must_use]
    pub fn question(&self, step: usize) -> Option<&Question> {
        step.checked_sub(1).and_then(|i| self.questions.get(i))
    }

    /// Last step of the script.
    #[must_use]
    pub fn last_step(&self) -> usize {
        self.questions.len()
    }
}

const DECLINE: &str =
    "Theek hai, agar aapko future mein madad chahiye ho toh zaroor batayen. Dhanyavaad!";

/// B.Sc Nursing admissions dialogue.
pub const ADMISSIONS: Script = Script {
    questions: &[
        Question {
            prompt: "Namaste! Kya aap Nursing College mein admission lene mein ruchi rakhte hain?",
            also_accepts: None,
            decline: DECLINE,
        },
        Question {
            prompt: "Kya aapne 12vi mein Biology padha hai?",
            also_accepts: Some("biology"),
            decline: "B.Sc Nursing mein admission ke liye Biology avashyak hai.",
        },
        Question {
            prompt: "Bahut accha! Main aapko B.Sc Nursing program ke baare mein kuch jankari deta hoon. \
                     Kya aap aur jaankari chahenge?",
            also_accepts: None,
            decline: DECLINE,
        },
        Question {
            prompt: "B.Sc Nursing ek full-time program hai jo aapko nursing field mein career ke liye tayyar karta hai. \
                     Kya aapko program ke fee structure ke baare mein jaankari chahiye?",
            also_accepts: None,
            decline: DECLINE,
        },
        Question {
            prompt: "Annual fee structure yeh hai:\n\
                     - Tuition Fee: ₹60,000\n\
                     - Bus Fee: ₹10,000\n\
                     - Total Annual Fees: ₹70,000\n\
                     Yeh fees 3 installments mein baanti jaati hai:\n\
                     1. Pehla Installment: ₹30,000 (admission ke samay)\n\
                     2. Dusra Installment: ₹20,000 (first semester ke baad)\n\
                     3. Teesra Installment: ₹20,000 (second semester ke baad)\n\
                     Kya aap hostel ya training facilities ke baare mein jaanna chahenge?",
            also_accepts: None,
            decline: DECLINE,
        },
        Question {
            prompt: "Hostel mein 24x7 paani aur bijli uplabdh hai, CCTV surveillance aur ek warden bhi hamesha available rahte hain. \
                     Hospital training bhi program ka hissa hai, jismein students ko real patients ke saath kaam karne ka mauka milta hai. \
                     Kya aap college ki location ke baare mein jaanna chahenge?",
            also_accepts: None,
            decline: DECLINE,
        },
        Question {
            prompt: "Hamara college Delhi mein sthit hai. \
                     Kya aap location ya aaspaas ke area ke baare mein aur jaankari chahenge?",
            also_accepts: None,
            decline: DECLINE,
        },
        Question {
            prompt: "College Indian Nursing Council (INC), Delhi se manayata prapt hai. \
                     Kya aap accreditation ke baare mein aur jaankari chahenge?",
            also_accepts: None,
            decline: DECLINE,
        },
        Question {
            prompt: "Clinical training ke liye students ko yeh locations par bheja jaata hai:\n\
                     - District Hospital (Backundpur)\n\
                     - Community Health Centers\n\
                     - Regional Hospital (Chartha)\n\
                     - Ranchi Neurosurgery and Allied Science Hospital (Ranchi, Jharkhand)\n\
                     Kya aap scholarship options ke baare mein jaanna chahenge?",
            also_accepts: None,
            decline: DECLINE,
        },
        Question {
            prompt: "Scholarship options uplabdh hain:\n\
                     - Government Post-Matric Scholarship (₹18,000 - ₹23,000)\n\
                     - Labour Ministry Scholarships (₹40,000 - ₹48,000), jo Labour Registration walon ke liye hain.\n\
                     Kya aap seats availability ke baare mein jaanna chahenge?",
            also_accepts: None,
            decline: DECLINE,
        },
        Question {
            prompt: "B.Sc Nursing program mein kul 60 seats uplabdh hain. \
                     Kya aap admission eligibility criteria ke baare mein jaanna chahenge?",
            also_accepts: None,
            decline: DECLINE,
        },
        Question {
            prompt: "Admission ke liye yeh criteria hain:\n\
                     - 12vi mein Biology hona chahiye\n\
                     - PNT Exam pass karna anivarya hai\n\
                     - Umar 17 se 35 saal ke beech honi chahiye\n\
                     Kya aapko aur kuch puchna hai ya admission process shuru karna hai?",
            also_accepts: None,
            decline: "Dhanyavaad! Agar aapko future mein madad chahiye ho toh zaroor batayen.",
        },
    ],
    closing: "Aap apne prashn puch sakte hain ya admission ke liye apply kar sakte hain. Dhanyavaad!",
    refusal: "Koi baat nahi! Aapne mana kiya, isliye hum yahin rukte hain. \
              Agar aapko future mein madad chahiye ho toh zaroor batayen. Dhanyavaad!",
    help: "Main aapki madad ke liye yahan hoon! Kripya nursing admission se judi koi bhi query poochhein \
           (jaise 'eligibility', 'fee', 'hostel', etc.)",
    follow_up: "\nYadi aap kisi vishesh topic par aur jaankari chahte hain, jaise 'fee structure', \
                'hostel', ya 'scholarship', toh please poochhein!",
    confused: "Maaf kijiye, main samajh nahi paaya. \
               Kya aap Nursing College mein admission mein ruchi rakhte hain?",
};

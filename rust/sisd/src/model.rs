use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    pub fn parse(s: &str) -> Option<Language> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Language::En),
            "zh" | "chinese" => Some(Language::Zh),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
        }
    }
}

const MONTH_NAMES_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MONTH_NAMES_ZH: [&str; 12] = [
    "一月", "二月", "三月", "四月", "五月", "六月", "七月", "八月", "九月", "十月", "十一月",
    "十二月",
];

/// Calendar month identified by ordinal. Display labels are a separate lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "MonthRepr", into = "String")]
pub struct Month(u8);

#[derive(Deserialize)]
#[serde(untagged)]
enum MonthRepr {
    Ordinal(u8),
    Name(String),
}

impl TryFrom<MonthRepr> for Month {
    type Error = String;

    fn try_from(raw: MonthRepr) -> Result<Self, Self::Error> {
        match raw {
            MonthRepr::Ordinal(n) => {
                Month::from_ordinal(n).ok_or_else(|| format!("month ordinal out of range: {n}"))
            }
            MonthRepr::Name(s) => Month::parse(&s).ok_or_else(|| format!("unknown month: {s}")),
        }
    }
}

impl From<Month> for String {
    fn from(m: Month) -> String {
        m.label(Language::En).to_string()
    }
}

impl Month {
    pub fn from_ordinal(n: u8) -> Option<Month> {
        (1..=12).contains(&n).then_some(Month(n))
    }

    pub fn ordinal(self) -> u8 {
        self.0
    }

    pub fn label(self, lang: Language) -> &'static str {
        let idx = (self.0 - 1) as usize;
        match lang {
            Language::En => MONTH_NAMES_EN[idx],
            Language::Zh => MONTH_NAMES_ZH[idx],
        }
    }

    /// Accepts an English name or a prefix of at least 3 letters ("Nov", "Sept"),
    /// a Chinese label ("十一月" or "11月"), or a bare ordinal ("11").
    pub fn parse(s: &str) -> Option<Month> {
        let t = s.trim();
        if t.is_empty() {
            return None;
        }
        if let Ok(n) = t.parse::<u8>() {
            return Month::from_ordinal(n);
        }
        if let Some(pos) = MONTH_NAMES_ZH.iter().position(|z| *z == t) {
            return Month::from_ordinal(pos as u8 + 1);
        }
        if let Some(head) = t.strip_suffix('月') {
            return head.trim().parse::<u8>().ok().and_then(Month::from_ordinal);
        }

        let lower = t.trim_end_matches('.').to_ascii_lowercase();
        if lower.len() < 3 {
            return None;
        }
        let mut hits = MONTH_NAMES_EN
            .iter()
            .enumerate()
            .filter(|(_, name)| name.to_ascii_lowercase().starts_with(&lower));
        let (idx, _) = hits.next()?;
        if hits.next().is_some() {
            return None;
        }
        Month::from_ordinal(idx as u8 + 1)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label(Language::En))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StudentStatus {
    Active,
    Inactive,
}

impl StudentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StudentStatus::Active => "Active",
            StudentStatus::Inactive => "Inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyScore {
    pub month: Month,
    pub score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub subject: String,
    pub semester: String,
    pub score: i64,
    #[serde(default)]
    pub monthly_scores: Vec<MonthlyScore>,
    #[serde(default)]
    pub teacher_comment: String,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub class_name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub attendance_rate: f64,
    #[serde(default)]
    pub enrollment_date: String,
    #[serde(default)]
    pub expected_graduation_date: String,
    pub status: StudentStatus,
    #[serde(default)]
    pub results: Vec<ExamResult>,
    #[serde(default)]
    pub activities: Vec<String>,
}

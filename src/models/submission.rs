use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::types::EpochMillis;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Platform {
    LeetCode,
    Codeforces,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// An accepted solution as extracted from a judge page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub platform: Platform,
    pub title: String,
    pub language: String,
    pub code: String,
    pub url: String,
    pub timestamp: EpochMillis,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contest_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_index: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
}

/// The fields that identify "the same problem" for duplicate suppression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NaturalKey<'a> {
    Title(&'a str),
    ContestProblem {
        contest_id: Option<&'a str>,
        problem_index: Option<&'a str>,
    },
}

impl Submission {
    pub fn new(
        platform: Platform,
        title: impl Into<String>,
        language: impl Into<String>,
        code: impl Into<String>,
        url: impl Into<String>,
        timestamp: EpochMillis,
    ) -> Submission {
        Submission {
            platform,
            title: title.into(),
            language: language.into(),
            code: code.into(),
            url: url.into(),
            timestamp,
            difficulty: None,
            contest_id: None,
            problem_index: None,
            division: None,
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Submission {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn with_contest(
        mut self,
        contest_id: Option<String>,
        problem_index: Option<String>,
        division: Option<String>,
    ) -> Submission {
        self.contest_id = contest_id;
        self.problem_index = problem_index;
        self.division = division;
        self
    }

    pub fn natural_key(&self) -> NaturalKey<'_> {
        match self.platform {
            Platform::LeetCode => NaturalKey::Title(&self.title),
            Platform::Codeforces => NaturalKey::ContestProblem {
                contest_id: self.contest_id.as_deref(),
                problem_index: self.problem_index.as_deref(),
            },
        }
    }
}

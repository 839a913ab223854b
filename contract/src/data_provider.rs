use crate::error::Error;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

const DEFAULT_PASSWORD_PATTERN: &str = "#########";

const FIRST_NAMES: &[&str] = &[
    "Anita", "Barb", "Chris", "Dinah", "Earl", "Faye", "Gail", "Hugh", "Ima", "Justin",
    "Kay", "Lou", "Max", "Neil", "Olive", "Paige", "Rick", "Sal", "Terry", "Will",
];

const LAST_NAMES: &[&str] = &[
    "Bath", "Dwyer", "P. Bacon", "Mite", "E. Bird", "Tality", "Force", "Jass", "Hogg",
    "Time", "Oss", "Zar", "Power", "Down", "Tree", "Turner", "Shaw", "Monella", "Byte",
    "Ing",
];

const JOB_LEVELS: &[&str] = &[
    "Senior", "Junior", "Lead", "Principal", "Chief", "Regional", "Global", "Internal",
];

const JOB_FIELDS: &[&str] = &[
    "Marketing", "Tactics", "Applications", "Operations", "Accounts", "Quality", "Data",
    "Security", "Research", "Finance",
];

const JOB_ROLES: &[&str] = &[
    "Developer", "Designer", "Liaison", "Manager", "Strategist", "Officer", "Consultant",
    "Engineer", "Analyst", "Architect",
];

/// Source of plausible payload values. Implementations only need to
/// produce non-empty ASCII strings; passwords must also be alphanumeric.
pub trait TestDataProvider {
    fn name(&mut self) -> String;

    fn job_title(&mut self) -> String;

    fn password(&mut self) -> String;
}

#[derive(Debug, Clone)]
pub struct RandomDataProvider {
    rng: StdRng,
    password_pattern: String,
}

impl RandomDataProvider {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            password_pattern: DEFAULT_PASSWORD_PATTERN.into(),
        }
    }

    /// Uses `pattern` for passwords, see [`RandomDataProvider::bothify`].
    pub fn with_password_pattern<S: Into<String>>(mut self, pattern: S) -> Result<Self, Error> {
        let pattern = pattern.into();

        if pattern.is_empty() || !pattern.chars().all(|c| c.is_ascii_alphanumeric() || c == '#' || c == '?') {
            return Err(Error::InvalidConfig(format!(
                "password pattern `{}` should be non-empty and only hold letters, digits, `#` or `?`",
                pattern
            )));
        }

        self.password_pattern = pattern;
        Ok(self)
    }

    /// Replaces every `#` with a random digit and every `?` with a random
    /// lowercase letter.
    pub fn bothify(&mut self, pattern: &str) -> String {
        pattern
            .chars()
            .map(|c| match c {
                '#' => char::from(b'0' + self.rng.gen_range(0..10u8)),
                '?' => char::from(b'a' + self.rng.gen_range(0..26u8)),
                other => other,
            })
            .collect()
    }

    fn pick(&mut self, words: &[&'static str]) -> &'static str {
        words.choose(&mut self.rng).copied().unwrap_or("Unknown")
    }
}

impl TestDataProvider for RandomDataProvider {
    fn name(&mut self) -> String {
        format!("{} {}", self.pick(FIRST_NAMES), self.pick(LAST_NAMES))
    }

    fn job_title(&mut self) -> String {
        format!(
            "{} {} {}",
            self.pick(JOB_LEVELS),
            self.pick(JOB_FIELDS),
            self.pick(JOB_ROLES)
        )
    }

    fn password(&mut self) -> String {
        let pattern = self.password_pattern.clone();
        self.bothify(&pattern)
    }
}

impl Default for RandomDataProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Hands out the same values every time. Replaying a recorded conversation
/// needs the values that were echoed back when it was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedDataProvider {
    name: String,
    job_title: String,
    password: String,
}

impl ScriptedDataProvider {
    pub fn new<S1: Into<String>, S2: Into<String>, S3: Into<String>>(
        name: S1,
        job_title: S2,
        password: S3,
    ) -> Self {
        Self {
            name: name.into(),
            job_title: job_title.into(),
            password: password.into(),
        }
    }
}

impl TestDataProvider for ScriptedDataProvider {
    fn name(&mut self) -> String {
        self.name.clone()
    }

    fn job_title(&mut self) -> String {
        self.job_title.clone()
    }

    fn password(&mut self) -> String {
        self.password.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passwords_are_nine_digits_by_default() {
        let mut provider = RandomDataProvider::new();

        for _ in 0..100 {
            let password = provider.password();
            assert_eq!(password.len(), 9);
            assert!(password.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn bothify_keeps_literal_characters() {
        let mut provider = RandomDataProvider::seeded(7);

        let value = provider.bothify("id-??-##");

        assert_eq!(value.len(), 8);
        assert!(value.starts_with("id-"));
        assert!(value[3..5].chars().all(|c| c.is_ascii_lowercase()));
        assert_eq!(&value[5..6], "-");
        assert!(value[6..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn custom_pattern_passwords_stay_alphanumeric() {
        let mut provider = RandomDataProvider::seeded(11)
            .with_password_pattern("Pw??##??##")
            .unwrap();

        let password = provider.password();

        assert!(password.starts_with("Pw"));
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn rejects_patterns_that_break_passwords() {
        assert!(RandomDataProvider::new().with_password_pattern("").is_err());
        assert!(RandomDataProvider::new().with_password_pattern("###-###").is_err());
    }

    #[test]
    fn names_and_jobs_are_non_empty_ascii() {
        let mut provider = RandomDataProvider::new();

        for _ in 0..50 {
            let name = provider.name();
            let job = provider.job_title();
            assert!(!name.is_empty() && name.is_ascii());
            assert!(!job.is_empty() && job.is_ascii());
            assert_eq!(job.split(' ').count(), 3);
        }
    }

    #[test]
    fn same_seed_gives_same_values() {
        let mut first = RandomDataProvider::seeded(42);
        let mut second = RandomDataProvider::seeded(42);

        assert_eq!(first.name(), second.name());
        assert_eq!(first.job_title(), second.job_title());
        assert_eq!(first.password(), second.password());
    }

    #[test]
    fn scripted_provider_repeats_its_values() {
        let mut provider = ScriptedDataProvider::new("Hugh Jass", "Lead Tactics Liaison", "482913057");

        assert_eq!(provider.name(), "Hugh Jass");
        assert_eq!(provider.name(), "Hugh Jass");
        assert_eq!(provider.job_title(), "Lead Tactics Liaison");
        assert_eq!(provider.password(), "482913057");
    }
}

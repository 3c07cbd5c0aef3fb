use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Preference text used when the user leaves the field blank.
pub const DEFAULT_PREFERENCES: &str = "No specific preferences";

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What the user wants to achieve with the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    #[serde(alias = "lose_weight")]
    Reduce,
    #[serde(alias = "gain_weight")]
    Gain,
    Maintain,
}

impl Goal {
    /// Map an interactive menu choice (`1`..`3`) to a goal.
    pub fn from_menu_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Self::Reduce),
            "2" => Some(Self::Gain),
            "3" => Some(Self::Maintain),
            _ => None,
        }
    }

    /// Human-readable label used in prompts and console output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Reduce => "lose weight",
            Self::Gain => "gain weight",
            Self::Maintain => "maintain weight",
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Reduce => "reduce",
            Self::Gain => "gain",
            Self::Maintain => "maintain",
        };
        f.write_str(s)
    }
}

impl FromStr for Goal {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reduce" | "lose_weight" | "lose" => Ok(Self::Reduce),
            "gain" | "gain_weight" => Ok(Self::Gain),
            "maintain" => Ok(Self::Maintain),
            other => Err(ProfileError::InvalidGoal(other.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------

/// Biological sex, which selects the BMR formula variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Map an interactive menu choice (`1`..`2`) to a sex.
    pub fn from_menu_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Self::Male),
            "2" => Some(Self::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Male => "male",
            Self::Female => "female",
        };
        f.write_str(s)
    }
}

impl FromStr for Sex {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            other => Err(ProfileError::InvalidSex(other.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Errors raised while building a [`UserProfile`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("weight must be a positive number of kilograms, got {0}")]
    InvalidWeight(f64),

    #[error("height must be a positive number of centimetres, got {0}")]
    InvalidHeight(f64),

    #[error("age must be between 1 and 119 years, got {0}")]
    InvalidAge(u32),

    #[error("invalid goal {0:?} (expected reduce, gain, or maintain)")]
    InvalidGoal(String),

    #[error("invalid sex {0:?} (expected male or female)")]
    InvalidSex(String),
}

/// One user's request. Immutable once constructed.
///
/// Fields are private so every instance has passed [`UserProfile::new`];
/// deserialization goes through the same checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawProfile")]
pub struct UserProfile {
    goal: Goal,
    sex: Sex,
    weight: f64,
    height: f64,
    age: u32,
    preferences: String,
}

#[derive(Deserialize)]
struct RawProfile {
    goal: Goal,
    #[serde(alias = "gender")]
    sex: Sex,
    weight: f64,
    height: f64,
    age: u32,
    #[serde(default)]
    preferences: String,
}

impl TryFrom<RawProfile> for UserProfile {
    type Error = ProfileError;

    fn try_from(raw: RawProfile) -> Result<Self, Self::Error> {
        Self::new(
            raw.goal,
            raw.sex,
            raw.weight,
            raw.height,
            raw.age,
            raw.preferences,
        )
    }
}

impl UserProfile {
    /// Validate and build a profile.
    ///
    /// Blank preferences are replaced with [`DEFAULT_PREFERENCES`] so the
    /// preference stage always has something to interpret.
    pub fn new(
        goal: Goal,
        sex: Sex,
        weight: f64,
        height: f64,
        age: u32,
        preferences: impl Into<String>,
    ) -> Result<Self, ProfileError> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(ProfileError::InvalidWeight(weight));
        }
        if !height.is_finite() || height <= 0.0 {
            return Err(ProfileError::InvalidHeight(height));
        }
        if age == 0 || age >= 120 {
            return Err(ProfileError::InvalidAge(age));
        }

        let preferences = preferences.into();
        let preferences = match preferences.trim() {
            "" => DEFAULT_PREFERENCES.to_owned(),
            trimmed => trimmed.to_owned(),
        };

        Ok(Self {
            goal,
            sex,
            weight,
            height,
            age,
            preferences,
        })
    }

    pub fn goal(&self) -> Goal {
        self.goal
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    /// Body weight in kilograms.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Height in centimetres.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Age in whole years.
    pub fn age(&self) -> u32 {
        self.age
    }

    /// Free-text dietary preferences, never blank.
    pub fn preferences(&self) -> &str {
        &self.preferences
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(weight: f64, height: f64, age: u32) -> Result<UserProfile, ProfileError> {
        UserProfile::new(Goal::Reduce, Sex::Male, weight, height, age, "vegan")
    }

    #[test]
    fn accepts_valid_profile() {
        let p = profile(85.0, 180.0, 30).unwrap();
        assert_eq!(p.goal(), Goal::Reduce);
        assert_eq!(p.sex(), Sex::Male);
        assert_eq!(p.preferences(), "vegan");
    }

    #[test]
    fn rejects_non_positive_weight() {
        assert_eq!(profile(0.0, 180.0, 30), Err(ProfileError::InvalidWeight(0.0)));
        assert!(matches!(
            profile(-3.0, 180.0, 30),
            Err(ProfileError::InvalidWeight(_))
        ));
        assert!(matches!(
            profile(f64::NAN, 180.0, 30),
            Err(ProfileError::InvalidWeight(_))
        ));
    }

    #[test]
    fn rejects_non_positive_height() {
        assert!(matches!(
            profile(80.0, 0.0, 30),
            Err(ProfileError::InvalidHeight(_))
        ));
    }

    #[test]
    fn age_bounds_are_exclusive() {
        assert_eq!(profile(80.0, 170.0, 0), Err(ProfileError::InvalidAge(0)));
        assert_eq!(profile(80.0, 170.0, 120), Err(ProfileError::InvalidAge(120)));
        assert!(profile(80.0, 170.0, 1).is_ok());
        assert!(profile(80.0, 170.0, 119).is_ok());
    }

    #[test]
    fn blank_preferences_get_default() {
        let p = UserProfile::new(Goal::Gain, Sex::Female, 55.0, 165.0, 25, "   ").unwrap();
        assert_eq!(p.preferences(), DEFAULT_PREFERENCES);
    }

    #[test]
    fn goal_parses_canonical_and_legacy_names() {
        assert_eq!("reduce".parse::<Goal>().unwrap(), Goal::Reduce);
        assert_eq!("lose_weight".parse::<Goal>().unwrap(), Goal::Reduce);
        assert_eq!("GAIN_WEIGHT".parse::<Goal>().unwrap(), Goal::Gain);
        assert_eq!("maintain".parse::<Goal>().unwrap(), Goal::Maintain);
        assert!(matches!(
            "bulk".parse::<Goal>(),
            Err(ProfileError::InvalidGoal(_))
        ));
    }

    #[test]
    fn menu_choices_map_to_variants() {
        assert_eq!(Goal::from_menu_choice("1"), Some(Goal::Reduce));
        assert_eq!(Goal::from_menu_choice(" 3 "), Some(Goal::Maintain));
        assert_eq!(Goal::from_menu_choice("4"), None);
        assert_eq!(Sex::from_menu_choice("2"), Some(Sex::Female));
        assert_eq!(Sex::from_menu_choice("x"), None);
    }

    #[test]
    fn deserialize_runs_validation() {
        let ok = r#"{"goal":"lose_weight","gender":"male","weight":85,"height":180,"age":30,"preferences":"vegan"}"#;
        let p: UserProfile = serde_json::from_str(ok).unwrap();
        assert_eq!(p.goal(), Goal::Reduce);

        let bad = r#"{"goal":"gain","sex":"female","weight":-1,"height":160,"age":20}"#;
        assert!(serde_json::from_str::<UserProfile>(bad).is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for goal in [Goal::Reduce, Goal::Gain, Goal::Maintain] {
            assert_eq!(goal.to_string().parse::<Goal>().unwrap(), goal);
        }
        for sex in [Sex::Male, Sex::Female] {
            assert_eq!(sex.to_string().parse::<Sex>().unwrap(), sex);
        }
    }
}

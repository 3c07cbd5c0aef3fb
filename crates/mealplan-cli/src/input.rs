//! Profile collection: command-line flags first, then interactive prompts
//! for whatever is missing.

use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use clap::Args;

use mealplan_core::models::{Goal, Sex, UserProfile};

/// Profile fields accepted on the command line. Anything left out is asked for.
#[derive(Debug, Clone, Default, Args)]
pub struct ProfileArgs {
    /// Goal: reduce, gain, or maintain
    #[arg(long)]
    pub goal: Option<Goal>,

    /// Sex: male or female
    #[arg(long)]
    pub sex: Option<Sex>,

    /// Weight in kilograms
    #[arg(long)]
    pub weight: Option<f64>,

    /// Height in centimetres
    #[arg(long)]
    pub height: Option<f64>,

    /// Age in years
    #[arg(long)]
    pub age: Option<u32>,

    /// Dietary preferences, allergies, or restrictions in free text
    #[arg(long)]
    pub preferences: Option<String>,
}

impl ProfileArgs {
    pub fn is_complete(&self) -> bool {
        self.goal.is_some()
            && self.sex.is_some()
            && self.weight.is_some()
            && self.height.is_some()
            && self.age.is_some()
            && self.preferences.is_some()
    }
}

/// Line-oriented questionnaire over any reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Fill the gaps in `args` and build a validated profile.
    pub fn complete_profile(&mut self, args: ProfileArgs) -> Result<UserProfile> {
        if !args.is_complete() {
            writeln!(self.output, "\n=== MEAL PLAN GENERATOR ===")?;
            writeln!(self.output, "Please provide your details:\n")?;
        }

        let goal = match args.goal {
            Some(goal) => goal,
            None => self.ask_goal()?,
        };
        let sex = match args.sex {
            Some(sex) => sex,
            None => self.ask_sex()?,
        };
        let weight = match args.weight {
            Some(weight) => weight,
            None => self.ask_number("Weight (kg): ", |w: &f64| w.is_finite() && *w > 0.0)?,
        };
        let height = match args.height {
            Some(height) => height,
            None => self.ask_number("Height (cm): ", |h: &f64| h.is_finite() && *h > 0.0)?,
        };
        let age = match args.age {
            Some(age) => age,
            None => self.ask_number("Age (years): ", |a: &u32| (1..120).contains(a))?,
        };
        let preferences = match args.preferences {
            Some(preferences) => preferences,
            None => self.read_line(
                "Dietary preferences (e.g. vegetarian, gluten-free, no lactose) or leave empty: ",
            )?,
        };

        UserProfile::new(goal, sex, weight, height, age, preferences)
            .context("invalid profile")
    }

    /// Ask for the goal. Unrecognized answers fall back to maintain.
    pub fn ask_goal(&mut self) -> Result<Goal> {
        writeln!(self.output, "Goal:")?;
        writeln!(self.output, "1. Lose weight")?;
        writeln!(self.output, "2. Gain weight")?;
        writeln!(self.output, "3. Maintain weight")?;
        let answer = self.read_line("Choose 1-3: ")?;
        Ok(Goal::from_menu_choice(&answer).unwrap_or_else(|| {
            tracing::debug!(answer = %answer, "unrecognized goal choice, using maintain");
            Goal::Maintain
        }))
    }

    /// Ask for sex. Unrecognized answers fall back to male.
    pub fn ask_sex(&mut self) -> Result<Sex> {
        writeln!(self.output, "\nSex:")?;
        writeln!(self.output, "1. Male")?;
        writeln!(self.output, "2. Female")?;
        let answer = self.read_line("Choose 1-2: ")?;
        Ok(Sex::from_menu_choice(&answer).unwrap_or_else(|| {
            tracing::debug!(answer = %answer, "unrecognized sex choice, using male");
            Sex::Male
        }))
    }

    /// Ask until the answer parses and passes `valid`.
    pub fn ask_number<T, F>(&mut self, prompt: &str, valid: F) -> Result<T>
    where
        T: FromStr,
        F: Fn(&T) -> bool,
    {
        loop {
            let answer = self.read_line(prompt)?;
            match answer.parse::<T>() {
                Ok(value) if valid(&value) => return Ok(value),
                _ => writeln!(self.output, "Please enter a valid number.")?,
            }
        }
    }

    fn read_line(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read from stdin")?;
        if read == 0 {
            bail!("input closed before the profile was complete");
        }
        Ok(line.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealplan_core::models::DEFAULT_PREFERENCES;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn full_interactive_session() {
        let mut p = prompter("1\n1\n85\n180\n30\nvegan\n");
        let profile = p.complete_profile(ProfileArgs::default()).unwrap();
        assert_eq!(profile.goal(), Goal::Reduce);
        assert_eq!(profile.sex(), Sex::Male);
        assert_eq!(profile.weight(), 85.0);
        assert_eq!(profile.height(), 180.0);
        assert_eq!(profile.age(), 30);
        assert_eq!(profile.preferences(), "vegan");

        let shown = String::from_utf8(p.output).unwrap();
        assert!(shown.contains("=== MEAL PLAN GENERATOR ==="));
        assert!(shown.contains("3. Maintain weight"));
    }

    #[test]
    fn invalid_menu_choices_fall_back() {
        let mut p = prompter("7\nx\n70\n175\n40\n\n");
        let profile = p.complete_profile(ProfileArgs::default()).unwrap();
        assert_eq!(profile.goal(), Goal::Maintain);
        assert_eq!(profile.sex(), Sex::Male);
        assert_eq!(profile.preferences(), DEFAULT_PREFERENCES);
    }

    #[test]
    fn invalid_numbers_are_asked_again() {
        let mut p = prompter("abc\n-5\n0\n72.5\n");
        let weight: f64 = p.ask_number("Weight (kg): ", |w: &f64| *w > 0.0).unwrap();
        assert_eq!(weight, 72.5);
        let shown = String::from_utf8(p.output).unwrap();
        assert_eq!(shown.matches("Please enter a valid number.").count(), 3);
    }

    #[test]
    fn age_out_of_range_is_asked_again() {
        let mut p = prompter("0\n150\n30\n");
        let age: u32 = p.ask_number("Age: ", |a: &u32| (1..120).contains(a)).unwrap();
        assert_eq!(age, 30);
    }

    #[test]
    fn flags_skip_prompts() {
        let args = ProfileArgs {
            goal: Some(Goal::Gain),
            sex: Some(Sex::Female),
            weight: Some(60.0),
            height: Some(165.0),
            age: Some(25),
            preferences: Some("no lactose".to_string()),
        };
        assert!(args.is_complete());
        let mut p = prompter("");
        let profile = p.complete_profile(args).unwrap();
        assert_eq!(profile.goal(), Goal::Gain);
        assert_eq!(profile.preferences(), "no lactose");
        assert!(p.output.is_empty());
    }

    #[test]
    fn partial_flags_prompt_for_the_rest() {
        let args = ProfileArgs {
            goal: Some(Goal::Reduce),
            sex: Some(Sex::Male),
            weight: Some(90.0),
            ..ProfileArgs::default()
        };
        let mut p = prompter("182\n45\ngluten-free\n");
        let profile = p.complete_profile(args).unwrap();
        assert_eq!(profile.height(), 182.0);
        assert_eq!(profile.age(), 45);
        assert_eq!(profile.preferences(), "gluten-free");

        let shown = String::from_utf8(p.output).unwrap();
        assert!(!shown.contains("Goal:"));
        assert!(shown.contains("Height (cm): "));
    }

    #[test]
    fn invalid_flag_value_is_rejected() {
        let args = ProfileArgs {
            goal: Some(Goal::Reduce),
            sex: Some(Sex::Male),
            weight: Some(-1.0),
            height: Some(180.0),
            age: Some(30),
            preferences: Some(String::new()),
        };
        let err = prompter("").complete_profile(args).unwrap_err();
        assert!(format!("{err:#}").contains("weight must be a positive number"));
    }

    #[test]
    fn closed_input_is_an_error() {
        let err = prompter("1\n").complete_profile(ProfileArgs::default()).unwrap_err();
        assert!(err.to_string().contains("input closed"));
    }
}

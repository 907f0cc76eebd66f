//! Landing grades and mission star ratings.
//!
//! Every credited landing is graded against two pairs of thresholds:
//! - Perfect: slow impact and quick settle
//! - Good: moderate impact and settle time
//! - Bad: anything else
//!
//! A mission earns up to three stars, one per flag in [`StarRecord`].

use crate::landing::LandingQuality;

/// Quality classification of one landing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LandingGrade {
    Perfect,
    Good,
    Bad,
}

impl LandingGrade {
    pub fn label(&self) -> &'static str {
        match self {
            LandingGrade::Perfect => "perfect",
            LandingGrade::Good => "good",
            LandingGrade::Bad => "bad",
        }
    }
}

/// Speed and duration limits for each grade.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradeThresholds {
    pub perfect_speed: f64,
    pub perfect_duration: f64,
    pub good_speed: f64,
    pub good_duration: f64,
}

impl Default for GradeThresholds {
    fn default() -> Self {
        Self {
            perfect_speed: 5.0,
            perfect_duration: 1.5,
            good_speed: 10.0,
            good_duration: 2.5,
        }
    }
}

/// Grade a landing. Both speed and duration must be within a grade's limits.
pub fn grade_landing(quality: &LandingQuality, thresholds: &GradeThresholds) -> LandingGrade {
    let within = |speed: f64, duration: f64| {
        quality.impact_speed <= speed && quality.duration <= duration
    };

    if within(thresholds.perfect_speed, thresholds.perfect_duration) {
        LandingGrade::Perfect
    } else if within(thresholds.good_speed, thresholds.good_duration) {
        LandingGrade::Good
    } else {
        LandingGrade::Bad
    }
}

/// The three mission-wide star flags.
///
/// All flags start set and are only ever cleared during a mission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StarRecord {
    /// Enough fuel left at the end.
    pub fuel: bool,
    pub no_bad_landings: bool,
    pub all_perfect: bool,
}

impl Default for StarRecord {
    fn default() -> Self {
        Self {
            fuel: true,
            no_bad_landings: true,
            all_perfect: true,
        }
    }
}

impl StarRecord {
    /// A record with no stars earned.
    pub fn empty() -> Self {
        Self {
            fuel: false,
            no_bad_landings: false,
            all_perfect: false,
        }
    }

    /// Number of stars earned, in [0, 3].
    pub fn count(&self) -> u8 {
        u8::from(self.fuel) + u8::from(self.no_bad_landings) + u8::from(self.all_perfect)
    }

    /// Clear the flags a landing of this grade breaks.
    pub fn apply_grade(&mut self, grade: LandingGrade) {
        match grade {
            LandingGrade::Perfect => {}
            LandingGrade::Good => self.all_perfect = false,
            LandingGrade::Bad => {
                self.no_bad_landings = false;
                self.all_perfect = false;
            }
        }
    }

    /// Stars earned in either record (best across attempts).
    pub fn best_of(&self, other: &StarRecord) -> StarRecord {
        StarRecord {
            fuel: self.fuel || other.fuel,
            no_bad_landings: self.no_bad_landings || other.no_bad_landings,
            all_perfect: self.all_perfect || other.all_perfect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quality(impact_speed: f64, duration: f64) -> LandingQuality {
        LandingQuality {
            impact_speed,
            duration,
        }
    }

    #[test]
    fn test_grade_boundaries_are_inclusive() {
        let t = GradeThresholds::default();
        assert_eq!(grade_landing(&quality(5.0, 1.5), &t), LandingGrade::Perfect);
        assert_eq!(grade_landing(&quality(5.01, 1.5), &t), LandingGrade::Good);
        assert_eq!(grade_landing(&quality(10.0, 2.5), &t), LandingGrade::Good);
        assert_eq!(grade_landing(&quality(10.0, 2.51), &t), LandingGrade::Bad);
    }

    #[test]
    fn test_slow_but_long_landing_is_not_perfect() {
        let t = GradeThresholds::default();
        assert_eq!(grade_landing(&quality(0.2, 2.0), &t), LandingGrade::Good);
        assert_eq!(grade_landing(&quality(0.2, 3.0), &t), LandingGrade::Bad);
    }

    #[test]
    fn test_grades_only_clear_flags() {
        let mut record = StarRecord::default();
        record.apply_grade(LandingGrade::Good);
        assert!(record.no_bad_landings);
        assert!(!record.all_perfect);

        record.apply_grade(LandingGrade::Perfect);
        assert!(!record.all_perfect, "Flags are never set back");

        record.apply_grade(LandingGrade::Bad);
        assert!(!record.no_bad_landings);
        assert_eq!(record.count(), 1);
    }

    #[test]
    fn test_star_count_matches_flags() {
        assert_eq!(StarRecord::default().count(), 3);
        assert_eq!(StarRecord::empty().count(), 0);
        let record = StarRecord {
            fuel: false,
            no_bad_landings: true,
            all_perfect: false,
        };
        assert_eq!(record.count(), 1);
    }

    #[test]
    fn test_best_of_keeps_earned_stars() {
        let first = StarRecord {
            fuel: true,
            no_bad_landings: false,
            all_perfect: false,
        };
        let second = StarRecord {
            fuel: false,
            no_bad_landings: true,
            all_perfect: false,
        };
        assert_eq!(first.best_of(&second).count(), 2);
    }
}

//! Nickname conflict resolution (ERR_NICKNAMEINUSE / 433).
//!
//! When the server rejects the requested nickname, [`resolve`] computes the
//! next candidate from the original nickname and the number of conflicts seen
//! during the current connection attempt.

/// Conflict bookkeeping for one connection attempt.
///
/// Created on the first 433 and discarded when a new attempt starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NicknameConflict {
    pub original: String,
    pub count: u32,
}

impl NicknameConflict {
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            count: 0,
        }
    }

    /// Record another conflict and return the next candidate nickname.
    pub fn next_candidate(&mut self, max_len: usize) -> String {
        self.count = self.count.saturating_add(1);
        resolve(&self.original, self.count, max_len)
    }
}

/// Compute an alternative nickname.
///
/// Total and deterministic: the result is never empty and never longer
/// than `max_len` characters (a `max_len` of zero is treated as one).
pub fn resolve(base: &str, conflict_count: u32, max_len: usize) -> String {
    let max_len = max_len.max(1);

    if base.is_empty() {
        return clamp(format!("User{conflict_count}"), max_len);
    }

    let base_len = base.chars().count();
    let count = conflict_count.to_string();

    let candidate = if base_len < max_len {
        let underscored = format!("{base}_");
        if conflict_count <= 1 && underscored.chars().count() <= max_len {
            underscored
        } else {
            with_suffix(base, &count, max_len)
        }
    } else {
        replace_tail(base, &count, max_len)
    };

    clamp(candidate, max_len)
}

/// Append `suffix`, truncating `base` if the result would not fit.
fn with_suffix(base: &str, suffix: &str, max_len: usize) -> String {
    let suffix_len = suffix.chars().count();
    if base.chars().count() + suffix_len <= max_len {
        return format!("{base}{suffix}");
    }
    replace_tail(base, suffix, max_len)
}

/// Overwrite the end of `base` with `suffix`, keeping as much prefix as fits.
///
/// Falls back to the last digit of `suffix` when the full suffix leaves no
/// room for any of the base.
fn replace_tail(base: &str, suffix: &str, max_len: usize) -> String {
    let suffix_len = suffix.chars().count();
    let suffix: String = if suffix_len >= max_len {
        suffix.chars().skip(suffix_len.saturating_sub(1)).collect()
    } else {
        suffix.to_string()
    };
    let keep = max_len.saturating_sub(suffix.chars().count());
    let prefix: String = base.chars().take(keep).collect();
    format!("{prefix}{suffix}")
}

fn clamp(candidate: String, max_len: usize) -> String {
    if candidate.chars().count() > max_len {
        candidate.chars().take(max_len).collect()
    } else {
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_conflict_appends_underscore() {
        assert_eq!(resolve("Rover", 1, 9), "Rover_");
    }

    #[test]
    fn subsequent_conflicts_append_count() {
        assert_eq!(resolve("Rover", 2, 9), "Rover2");
        assert_eq!(resolve("Rover", 13, 9), "Rover13");
    }

    #[test]
    fn suffix_truncates_base_when_needed() {
        assert_eq!(resolve("Roverdog", 12, 9), "Roverdo12");
    }

    #[test]
    fn underscore_falls_back_to_number_when_it_cannot_fit() {
        // "Rover" + "_" fits only if max_len >= 6
        assert_eq!(resolve("Rover", 1, 6), "Rover_");
        assert_eq!(resolve("Roverd", 1, 7), "Roverd_");
    }

    #[test]
    fn full_length_base_replaces_trailing_chars() {
        assert_eq!(resolve("RoverDogs", 1, 9), "RoverDog1");
        assert_eq!(resolve("RoverDogs", 42, 9), "RoverDo42");
    }

    #[test]
    fn count_wider_than_limit_uses_last_digit() {
        assert_eq!(resolve("ab", 123, 2), "a3");
        assert_eq!(resolve("abc", 123, 1), "3");
    }

    #[test]
    fn empty_base_uses_user_prefix() {
        assert_eq!(resolve("", 3, 9), "User3");
        assert_eq!(resolve("", 3, 2), "Us");
    }

    #[test]
    fn result_never_exceeds_limit_and_is_never_empty() {
        let bases = ["a", "Rover", "RoverDogs", "VeryLongNicknameIndeed", "ñíçk"];
        for base in bases {
            for count in 1..=120u32 {
                for max_len in 1..=12usize {
                    let out = resolve(base, count, max_len);
                    assert!(!out.is_empty(), "{base} {count} {max_len}");
                    assert!(
                        out.chars().count() <= max_len,
                        "{base} {count} {max_len} -> {out}"
                    );
                }
            }
        }
    }

    #[test]
    fn resolve_is_deterministic() {
        assert_eq!(resolve("Rover", 7, 9), resolve("Rover", 7, 9));
    }

    #[test]
    fn conflict_counts_monotonically() {
        let mut conflict = NicknameConflict::new("Rover");
        assert_eq!(conflict.next_candidate(9), "Rover_");
        assert_eq!(conflict.next_candidate(9), "Rover2");
        assert_eq!(conflict.next_candidate(9), "Rover3");
        assert_eq!(conflict.count, 3);
    }
}

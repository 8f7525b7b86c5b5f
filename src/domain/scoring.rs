//! Pure fractional-points table (SPEC_FULL.md §4.1).
//!
//! `points` is total on the valid input domain (sorted, non-empty, consecutive
//! placements in `[1,8]`) and has no side effects. Validating that the input
//! actually meets that shape is the caller's job (`domain::results`); an input
//! outside the domain is a bug, not a runtime condition, so it is rejected
//! with `AppError::Invalid` rather than silently returning 0.

use crate::errors::AppError;

pub fn points(placements: &[i32]) -> Result<f64, AppError> {
    let value = match placements {
        [1] => 8.2,
        [2] => 7.1,
        [2, 3] => 6.6,
        [2, 3, 4] => 6.1,
        [3] => 6.0,
        [3, 4] => 5.6,
        [3, 4, 5] => 5.1,
        [4] => 5.0,
        [4, 5] => 4.6,
        [4, 5, 6] => 4.1,
        [4, 5, 6, 7] => 3.6,
        [5] => 4.0,
        [5, 6] => 3.6,
        [5, 6, 7] => 3.1,
        [5, 6, 7, 8] => 2.6,
        [6] => 3.0,
        [6, 7] => 2.6,
        [6, 7, 8] => 2.1,
        [7] => 2.0,
        [7, 8] => 1.6,
        [8] => 1.0,
        other => {
            return Err(AppError::Invalid(format!(
                "no scoring entry for placements {:?}",
                other
            )));
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_placements_strictly_decrease() {
        let values: Vec<f64> = (1..=8).map(|p| points(&[p]).unwrap()).collect();
        for pair in values.windows(2) {
            assert!(pair[0] > pair[1], "expected {} > {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn shared_placement_groups_match_table() {
        assert_eq!(points(&[2, 3]).unwrap(), 6.6);
        assert_eq!(points(&[5, 6, 7, 8]).unwrap(), 2.6);
    }

    #[test]
    fn non_consecutive_is_rejected() {
        assert!(points(&[1, 3]).is_err());
    }

    #[test]
    fn out_of_range_is_rejected() {
        assert!(points(&[0]).is_err());
        assert!(points(&[9]).is_err());
    }

    #[test]
    fn tied_placement_scenario_from_spec() {
        // §8 scenario 4: [1], [2,3], [2,3], [4], [5], [6], [7], [8]
        let expected = [8.2, 6.6, 6.6, 5.0, 4.0, 3.0, 2.0, 1.0];
        let inputs: [&[i32]; 8] = [
            &[1],
            &[2, 3],
            &[2, 3],
            &[4],
            &[5],
            &[6],
            &[7],
            &[8],
        ];
        for (input, want) in inputs.iter().zip(expected.iter()) {
            assert_eq!(points(input).unwrap(), *want);
        }
    }
}

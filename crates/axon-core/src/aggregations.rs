use axon_error::{AxonResult, axon_bail};

/// Reduces a node's weighted inputs to a single value, selected by name from
/// the `aggregation_options` config set. Also used for the population-level
/// `fitness_criterion` and per-species `species_fitness_func` reductions.
///
/// An empty slice aggregates to `0.0` for every method; a node isolated by a
/// structural mutation contributes only its bias.
pub fn aggregate_vector(values: &[f32], method: &str) -> AxonResult<f32> {
    if !is_valid_aggregation(method) {
        axon_bail!(UnknownMethod: "invalid aggregation '{}' provided", method);
    }

    if values.is_empty() {
        return Ok(0.0);
    }

    let value = match method {
        "sum" => values.iter().sum(),
        "mean" => values.iter().sum::<f32>() / values.len() as f32,
        "max" => values.iter().copied().fold(f32::MIN, f32::max),
        "min" => values.iter().copied().fold(f32::MAX, f32::min),
        "median" => {
            let mut sorted = values.to_vec();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let mid = sorted.len() / 2;
            if sorted.len() % 2 == 0 {
                (sorted[mid - 1] + sorted[mid]) / 2.0
            } else {
                sorted[mid]
            }
        }
        _ => unreachable!(),
    };

    Ok(value)
}

/// Returns whether `method` names a known aggregation function.
pub fn is_valid_aggregation(method: &str) -> bool {
    matches!(method, "sum" | "mean" | "max" | "min" | "median")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axon_error::ErrorCode;

    #[test]
    fn sum_mean_max_min() {
        assert_eq!(aggregate_vector(&[1.0, 2.0, 3.0, 4.0, 5.0], "sum").unwrap(), 15.0);
        assert_eq!(aggregate_vector(&[1.0, 2.0, 3.0, 4.0, 5.0], "mean").unwrap(), 3.0);
        assert_eq!(aggregate_vector(&[-3.0, -1.0, 0.0, -2.0, -4.0], "max").unwrap(), 0.0);
        assert_eq!(
            aggregate_vector(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], "min").unwrap(),
            1.0
        );
    }

    #[test]
    fn median_even_averages_middle_pair() {
        assert_eq!(
            aggregate_vector(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], "median").unwrap(),
            3.5
        );
        assert_eq!(
            aggregate_vector(&[5.0, 1.0, 3.0, 2.0, 4.0], "median").unwrap(),
            3.0
        );
    }

    #[test]
    fn empty_aggregates_to_zero() {
        for method in ["sum", "mean", "max", "min", "median"] {
            assert_eq!(aggregate_vector(&[], method).unwrap(), 0.0);
        }
    }

    #[test]
    fn unknown_method_fails() {
        let err = aggregate_vector(&[1.0], "product").unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnknownMethod);
    }
}

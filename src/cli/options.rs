/// Options Error
#[derive(thiserror::Error, Debug)]
pub enum OptionsError {
    /// A comma-separated list holds something other than a positive integer
    #[error("invalid filter sizes {0:?}, expected e.g. '3,4,5'")]
    FilterSizes(String),
}

/// Parse comma-separated filter sizes such as `3,4,5`
pub fn parse_filter_sizes(value: &str) -> Result<Vec<usize>, OptionsError> {
    let sizes = value
        .split(',')
        .map(|size| size.trim().parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| OptionsError::FilterSizes(value.to_string()))?;

    if sizes.contains(&0) {
        return Err(OptionsError::FilterSizes(value.to_string()));
    }

    Ok(sizes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter_sizes() {
        assert_eq!(parse_filter_sizes("3,4,5").unwrap(), vec![3, 4, 5]);
        assert_eq!(parse_filter_sizes(" 2 , 7").unwrap(), vec![2, 7]);
    }

    #[test]
    fn test_reject_invalid_filter_sizes() {
        assert!(parse_filter_sizes("").is_err());
        assert!(parse_filter_sizes("3,,5").is_err());
        assert!(parse_filter_sizes("3,0").is_err());
        assert!(parse_filter_sizes("three").is_err());
    }
}

use derive_more::Display;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum Error {
    #[display(fmt = "Invalid input: {_0}")]
    Validation(String),

    #[display(fmt = "Internal computation error: {_0}")]
    Computation(String),
}

impl std::error::Error for Error {}

pub fn validate_table_priority(priority: i32) -> Result<()> {
    const MAX: i32 = 100;
    if !(0..=MAX).contains(&priority) {
        return Err(Error::Validation(format!(
            "Table priority {priority} is outside of [0..{MAX}]"
        )));
    }
    Ok(())
}

pub fn validate_round_number(number: i32) -> Result<()> {
    if number < 1 {
        return Err(Error::Validation(format!(
            "Round number {number} expected to be positive"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_table_priority_bounds() {
        assert!(validate_table_priority(0).is_ok());
        assert!(validate_table_priority(100).is_ok());
        assert!(matches!(
            validate_table_priority(101),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            validate_table_priority(-1),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_round_number() {
        assert!(validate_round_number(1).is_ok());
        assert!(validate_round_number(0).is_err());
        assert!(validate_round_number(-3).is_err());
    }
}

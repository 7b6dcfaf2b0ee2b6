use crate::error::AppError;

/// Collects field problems and turns them into one `Validation` error.
#[derive(Debug, Default)]
pub struct Violations(Vec<String>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn not_blank(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.0.push(format!("{} should not be empty", field));
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        let looks_valid = value
            .split_once('@')
            .map(|(local, domain)| {
                !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
            })
            .unwrap_or(false);
        if !looks_valid || value.contains(char::is_whitespace) {
            self.0.push(format!("{} must be an email", field));
        }
        self
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        if value.chars().count() < min {
            self.0.push(format!(
                "{} must be longer than or equal to {} characters",
                field, min
            ));
        }
        self
    }

    pub fn optional<T: ?Sized>(
        &mut self,
        value: Option<&T>,
        check: impl FnOnce(&mut Self, &T),
    ) -> &mut Self {
        if let Some(value) = value {
            check(self, value);
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(std::mem::take(&mut self.0)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_problem() {
        let err = Violations::new()
            .not_blank("first_name", "  ")
            .email("email", "not-an-email")
            .min_len("password", "abc", 6)
            .finish()
            .unwrap_err();

        match err {
            AppError::Validation(problems) => assert_eq!(problems.len(), 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn optional_fields_are_checked_only_when_present() {
        let missing: Option<&str> = None;
        assert!(Violations::new()
            .optional(missing, |v, s| {
                v.email("email", s);
            })
            .finish()
            .is_ok());

        assert!(Violations::new()
            .optional(Some("x@y"), |v, s| {
                v.email("email", s);
            })
            .finish()
            .is_err());

        assert!(Violations::new()
            .email("email", "john@deptech.com")
            .finish()
            .is_ok());
    }
}

use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{5,16}$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

/// 课程与专业代码：字母开头，字母数字或连字符，2-20 位
static CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]{1,19}$").expect("Invalid code regex"));

const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "12345678",
    "123456789",
    "qwerty123",
    "admin123",
    "abcd1234",
    "letmein1",
    "welcome1",
];

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if !(5..=16).contains(&username.chars().count()) {
        return Err("Username length must be between 5 and 16 characters");
    }
    if !USERNAME_RE.is_match(username) {
        return Err("Username must contain only letters, numbers, underscores or hyphens");
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.len() > 254 || !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

pub fn validate_code(code: &str) -> Result<(), &'static str> {
    if !CODE_RE.is_match(code) {
        return Err(
            "Code must start with a letter and contain 2-20 letters, digits or hyphens",
        );
    }
    Ok(())
}

/// 必填文本字段：去除首尾空白后非空且不超过 `max_chars`
pub fn validate_required_text(field: &str, value: &str, max_chars: usize) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    if trimmed.chars().count() > max_chars {
        return Err(format!("{field} must be at most {max_chars} characters"));
    }
    Ok(())
}

/// 密码强度检查，返回全部未满足的规则
///
/// 至少 8 位，包含大写、小写与数字，且不在常见密码表中。
pub fn password_issues(password: &str) -> Vec<&'static str> {
    let mut issues = Vec::new();

    if password.chars().count() < 8 {
        issues.push("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        issues.push("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        issues.push("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        issues.push("Password must contain at least one digit");
    }
    if COMMON_PASSWORDS
        .iter()
        .any(|weak| password.eq_ignore_ascii_case(weak))
    {
        issues.push("Password is too common, please choose a stronger password");
    }

    issues
}

pub fn validate_password(password: &str) -> Result<(), String> {
    let issues = password_issues(password);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("alice_01").is_ok());
        assert!(validate_username("abc").is_err());
        assert!(validate_username("this-name-is-far-too-long").is_err());
        assert!(validate_username("bad name").is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("student@uni.edu").is_ok());
        assert!(validate_email("no-at-sign.edu").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn test_code_rules() {
        assert!(validate_code("CS101").is_ok());
        assert!(validate_code("MATH-2").is_ok());
        assert!(validate_code("1CS").is_err());
        assert!(validate_code("C").is_err());
    }

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("title", "Week 1", 10).is_ok());
        assert!(validate_required_text("title", "   ", 10).is_err());
        assert!(validate_required_text("title", "abcdefghijk", 10).is_err());
    }

    #[test]
    fn test_strong_password() {
        assert!(validate_password("SecurePass123").is_ok());
        assert!(password_issues("MyP@ssw0rd").is_empty());
    }

    #[test]
    fn test_weak_passwords() {
        assert!(
            password_issues("Ab1").contains(&"Password must be at least 8 characters long")
        );
        assert!(
            password_issues("abcd1234")
                .contains(&"Password must contain at least one uppercase letter")
        );
        assert!(
            password_issues("ABCD1234")
                .contains(&"Password must contain at least one lowercase letter")
        );
        assert!(password_issues("AbcdEfgh").contains(&"Password must contain at least one digit"));
        assert!(
            password_issues("Password1")
                .contains(&"Password is too common, please choose a stronger password")
        );
    }
}

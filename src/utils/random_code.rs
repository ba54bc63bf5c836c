use rand::Rng;

/// 去掉了易混淆的 0/O/1/I
const ENROLLMENT_KEY_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const ENROLLMENT_KEY_LEN: usize = 8;

/// 生成课程选课密钥
pub fn generate_enrollment_key() -> String {
    generate_code(ENROLLMENT_KEY_CHARSET, ENROLLMENT_KEY_LEN)
}

/// 生成随机初始密码（管理员种子账号）
pub fn generate_password() -> String {
    let mut rng = rand::rng();
    let body = generate_code(b"abcdefghijkmnpqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ23456789", 13);
    // 保证满足密码强度规则
    let upper = ENROLLMENT_KEY_CHARSET[rng.random_range(0..24)] as char;
    let digit = (b'2' + rng.random_range(0..8u8)) as char;
    format!("{body}a{upper}{digit}")
}

fn generate_code(charset: &[u8], len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| charset[rng.random_range(0..charset.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validate::validate_password;

    #[test]
    fn test_enrollment_key_shape() {
        let key = generate_enrollment_key();
        assert_eq!(key.len(), ENROLLMENT_KEY_LEN);
        assert!(key.bytes().all(|b| ENROLLMENT_KEY_CHARSET.contains(&b)));
    }

    #[test]
    fn test_generated_password_is_strong() {
        for _ in 0..20 {
            assert!(validate_password(&generate_password()).is_ok());
        }
    }
}

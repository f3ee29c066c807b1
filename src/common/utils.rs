/// 常量时间比较两个字节序列
///
/// 长度不同时立即返回 false；长度相同时总是遍历全部字节，只有全部匹配才返回 true。
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (byte_a, byte_b) in a.iter().zip(b.iter()) {
        diff |= byte_a ^ byte_b;
    }

    diff == 0
}

/// 以 `0o600` 形式渲染 Unix 权限位，用于日志
pub fn format_mode(mode: u32) -> String {
    format!("{:#o}", mode & 0o7777)
}

//! Prompt text sent to vision models.

pub const SYSTEM_PROMPT: &str = "你是HR助手，根据JD分析候选人截图，判断是否匹配。评判：技能、行业、年限、项目经验。仅输出JSON，满足60%要求即匹配。";

pub const TEST_PROMPT: &str = r#"Hello, please respond with "OK" if you are working."#;

/// User prompt asking for a JSON verdict against `job_description`.
pub fn build_user_prompt(job_description: &str) -> String {
    format!(
        "JD要求：{job_description}\n\n分析图片中的候选人，输出JSON：\n{{\"match\":true/false,\"confidence\":0-1,\"reason\":\"原因（30字内）\",\"highlights\":[\"点1\",\"点2\"]}}"
    )
}

/// System and user prompt joined for providers without a system role.
pub fn build_prompt(job_description: &str) -> String {
    format!("{SYSTEM_PROMPT}\n\n{}", build_user_prompt(job_description))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_embeds_job_description() {
        let p = build_user_prompt("3年以上Rust开发经验");
        assert!(p.starts_with("JD要求：3年以上Rust开发经验"));
        assert!(p.contains(r#"{"match":true/false"#));
    }

    #[test]
    fn test_combined_prompt_starts_with_system() {
        let p = build_prompt("jd");
        assert!(p.starts_with(SYSTEM_PROMPT));
        assert!(p.contains("JD要求：jd"));
    }
}

//! Prompts sent with every plant analysis.
//!
//! The report renderer in [`crate::report`] understands only `#`-headings,
//! `*`/`-` bullets, blank lines and plain paragraphs, so the system instruction
//! asks for exactly that shape. Callers can override it via
//! [`crate::config::AnalysisConfig::system_prompt`].

/// Default system instruction for the diagnosis.
pub const SYSTEM_INSTRUCTION: &str = r#"You are an expert plant pathologist and botanist. Analyze the provided image of a plant.
1. **Overall Assessment:** Start with a general assessment (e.g., 'The plant appears healthy,' or 'The plant shows signs of distress.').
2. **Specific Issues (if any):**
    * For each detected disease or pest:
        * **Name:** Clearly state the name of the disease/pest. Use bold for the name.
        * **Symptoms:** Describe the symptoms visible in the image and other common symptoms.
        * **Treatment:** Provide detailed, actionable treatment steps. Use bullet points for steps.
        * **Prevention:** Offer preventative measures for the future. Use bullet points.
3. **If Healthy:** If no issues are found, confirm its health and state: "This plant appears to be healthy. No immediate concerns detected."
Format your response clearly using headings (e.g., ## Assessment, ## Disease Name) and bullet points for lists. Be concise yet thorough.
"#;

/// Text part sent next to the image.
pub const USER_PROMPT: &str = "Please analyze this plant image based on your system instructions.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_instruction_asks_for_renderable_markup() {
        assert!(SYSTEM_INSTRUCTION.contains("## Assessment"));
        assert!(SYSTEM_INSTRUCTION.contains("bullet points"));
        assert!(SYSTEM_INSTRUCTION
            .contains("This plant appears to be healthy. No immediate concerns detected."));
    }

    #[test]
    fn user_prompt_is_single_line() {
        assert!(!USER_PROMPT.contains('\n'));
    }
}

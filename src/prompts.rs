//! Prompt for VLM-based line correction.
//!
//! Centralising the prompt here serves two purposes:
//!
//! 1. **Single source of truth** — tightening a rule or changing the worked
//!    example touches exactly one place, never the retry or validation logic.
//!
//! 2. **Testability** — unit tests can inspect the assembled request text
//!    without spinning up a real model.

use serde::Serialize;

/// Instructional prefix sent before the serialized request payload.
///
/// The line-count rule is stated twice on purpose: it is the single hard
/// invariant the validator enforces, and models follow it far more reliably
/// when the instruction brackets the example.
pub const REWRITING_PROMPT: &str = r#"You are a text correction expert specializing in accurately reproducing text from images.
You will receive an image of a text block and a set of extracted lines corresponding to the text in the image.
Your task is to correct any errors in the extracted lines, including math, formatting, and other inaccuracies, and output the corrected lines in a JSON format.
The number of output lines MUST match the number of input lines.

**Instructions:**

1. Carefully examine the provided text block image.
2. Analyze the extracted lines.
3. For each extracted line, compare it to the corresponding line in the image.
4. Correct any errors in the extracted line, including:
    * Inline math: Ensure all mathematical expressions are correctly formatted and rendered.
    * Formatting: Maintain consistent formatting with the text block image, including spacing, indentation, and special characters.
    * Other inaccuracies: If the image is handwritten then you may correct any spelling errors, or other discrepancies.
5. Do not remove any formatting i.e bold, italics, etc from the extracted lines unless it is necessary to correct the error.
6. Ensure that inline math is properly surrounded with inline math tags.
7. The number of corrected lines in the output MUST equal the number of extracted lines provided in the input. Do not add or remove lines.
8. Output the corrected lines in JSON format with a "corrected_lines" field, as shown in the example below.

**Example:**

Input:
```
{
 "extracted_lines": [
  "Adversarial training (AT) [23], which aims to minimize\n",
  "the model's risk under the worst-case perturbations, is cur-\n",
  "rently the most effective approach for improving the robust-\n",
  "ness of deep neural networks. For a given neural network\n",
  "f(x, w) with parameters w, the optimization objective of\n",
  "AT can be formulated as follows:\n"
 ]
}
```

Output:

```json
{
 "corrected_lines": [
  "Adversarial training (AT) [23], which aims to minimize\n",
  "the model's risk under the worst-case perturbations, is cur-\n",
  "rently the most effective approach for improving the robust-\n",
  "ness of deep neural networks. For a given neural network\n",
  "<math>f(x, w)</math> with parameters <math>w</math>, the optimization objective of\n",
  "AT can be formulated as follows:\n"
 ]
}
```

**Input:**

"#;

#[derive(Serialize)]
struct RequestPayload<'a> {
    extracted_lines: &'a [String],
}

/// Assemble the full request text: instructional prefix plus the serialized
/// extracted lines in a fenced JSON block.
pub fn build_rewriting_prompt(extracted_lines: &[String]) -> Result<String, serde_json::Error> {
    let payload = serde_json::to_string_pretty(&RequestPayload { extracted_lines })?;
    Ok(format!("{REWRITING_PROMPT}```json\n{payload}\n```\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_states_the_line_count_rule() {
        assert!(REWRITING_PROMPT.contains("MUST match the number of input lines"));
        assert!(REWRITING_PROMPT.contains("corrected_lines"));
    }

    #[test]
    fn build_prompt_embeds_the_extracted_lines() {
        let lines = vec!["first line\n".to_string(), "second line\n".to_string()];
        let prompt = build_rewriting_prompt(&lines).unwrap();
        assert!(prompt.starts_with(REWRITING_PROMPT));
        assert!(prompt.contains("\"extracted_lines\""));
        assert!(prompt.contains("first line\\n"));
        assert!(prompt.ends_with("```\n"));
    }
}

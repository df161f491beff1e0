//! Console prediction: prompt for each feature, validate inline, predict

use crate::core::{FieldError, Label, OncoError, Result, Sample, FEATURES, N_FEATURES};
use crate::predict::{predict, ModelSlot};
use std::io::{BufRead, Write};
use std::path::Path;

/// Result of one interactive prediction attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Predicted(Label),
    /// A value failed validation; no prediction was attempted
    Rejected(FieldError),
    /// The model could not be loaded or applied
    Unavailable(String),
}

/// Prompt for every feature in schema order.
///
/// Returns `Ok(Err(_))` on the first invalid value without prompting further.
pub fn read_sample<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<std::result::Result<Sample, FieldError>> {
    let mut features = [0.0; N_FEATURES];
    let mut line = String::new();

    for (slot, spec) in features.iter_mut().zip(FEATURES.iter()) {
        write!(output, "{}", spec.prompt)?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(OncoError::IoError(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("input ended before {} was entered", spec.name),
            )));
        }

        match spec.parse(line.trim()) {
            Ok(value) => *slot = value,
            Err(e) => return Ok(Err(e)),
        }
    }

    Ok(Ok(Sample::unlabeled(features)))
}

/// Run one prompt-and-predict round against the artifact at `model_path`.
///
/// The model is loaded only once all values are valid.
pub fn run<R: BufRead, W: Write>(model_path: &Path, input: &mut R, output: &mut W) -> Result<Outcome> {
    writeln!(output, "\nEnter the following details for prediction:")?;

    let sample = match read_sample(input, output)? {
        Ok(sample) => sample,
        Err(e) => {
            writeln!(output, "Invalid input: {e}")?;
            return Ok(Outcome::Rejected(e));
        }
    };

    let slot = ModelSlot::load(model_path);
    let outcome = match slot.current().and_then(|model| predict(&model, &sample)) {
        Ok(label) => {
            let message = match label {
                Label::Positive => "Prediction: Cancer detected.",
                Label::Negative => "Prediction: No cancer detected.",
            };
            writeln!(output, "{message}")?;
            Outcome::Predicted(label)
        }
        Err(e) => {
            writeln!(output, "Error loading or predicting with the model: {e}")?;
            writeln!(output, "Prediction could not be made.")?;
            Outcome::Unavailable(e.to_string())
        }
    };

    Ok(outcome)
}

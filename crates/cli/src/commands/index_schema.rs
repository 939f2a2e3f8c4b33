//! Story index definition export.

use lobsters_site::error::AppError;
use lobsters_site::search::STORY_INDEX;

/// Print the story index definition as pretty JSON.
///
/// # Errors
///
/// Returns `AppError::Serialization` if the definition cannot be encoded.
pub fn print() -> Result<(), AppError> {
    let json = STORY_INDEX.to_json()?;

    #[allow(clippy::print_stdout)]
    {
        println!("{json}");
    }
    Ok(())
}

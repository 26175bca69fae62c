use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfirmError {
    #[error("確認の入力を読めませんでした")]
    Io(#[from] io::Error),
    #[error("確認の入力が途中で終了しました")]
    Closed,
}

/// Prompts `"<message> [y/n]: "` until the answer is y/yes/n/no
/// (case-insensitive). End of input is an error, never a silent "no".
pub fn ask_for_confirmation<R, W>(
    message: &str,
    reader: &mut R,
    writer: &mut W,
) -> Result<bool, ConfirmError>
where
    R: BufRead,
    W: Write,
{
    loop {
        write!(writer, "{} [y/n]: ", message)?;
        writer.flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Err(ConfirmError::Closed);
        }

        match line.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => continue,
        }
    }
}

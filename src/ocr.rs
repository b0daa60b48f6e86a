use std::{path::Path, process::Command};

use regex::Regex;
use tracing::debug;

use crate::error::OcrError;

/// Turns a ticket image into text. Image preprocessing is up to the implementor.
pub trait TextExtractor {
    fn extract_text(&self, image: &Path) -> Result<String, OcrError>;
}

impl<E: TextExtractor + ?Sized> TextExtractor for &E {
    fn extract_text(&self, image: &Path) -> Result<String, OcrError> {
        (**self).extract_text(image)
    }
}

/// Shells out to the `tesseract` command line tool.
#[derive(Debug, Clone)]
pub struct TesseractExtractor {
    pub program: String,
    pub page_segmentation_mode: u8,
}

impl Default for TesseractExtractor {
    fn default() -> Self {
        Self {
            program: "tesseract".to_owned(),
            // a single uniform block of text
            page_segmentation_mode: 6,
        }
    }
}

impl TextExtractor for TesseractExtractor {
    fn extract_text(&self, image: &Path) -> Result<String, OcrError> {
        let extraction = |reason: String| OcrError::Extraction {
            image: image.display().to_string(),
            reason,
        };
        let output = Command::new(&self.program)
            .arg(image)
            .arg("stdout")
            .arg("--psm")
            .arg(self.page_segmentation_mode.to_string())
            .output()
            .map_err(|err| extraction(format!("cannot start {:?}: {}", self.program, err)))?;
        if !output.status.success() {
            return Err(extraction(format!(
                "{:?} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Finds standalone single digits within an expected range.
#[derive(Debug, Clone)]
pub struct TicketCountParser {
    pattern: Regex,
}

impl TicketCountParser {
    pub fn new(min: u8, max: u8) -> Result<Self, OcrError> {
        if min > max || max > 9 {
            return Err(OcrError::InvalidDigitRange { min, max });
        }
        let pattern = Regex::new(&format!(r"\b[{}-{}]\b", min, max))
            .map_err(|_| OcrError::InvalidDigitRange { min, max })?;
        Ok(Self { pattern })
    }

    /// First match wins.
    pub fn parse(&self, text: &str) -> Result<u32, OcrError> {
        self.pattern
            .find(text)
            .and_then(|digit| digit.as_str().parse().ok())
            .ok_or(OcrError::NoMatch)
    }
}

impl Default for TicketCountParser {
    fn default() -> Self {
        Self {
            pattern: Regex::new(r"\b[1-5]\b").unwrap_or_else(|err| unreachable!("{}", err)),
        }
    }
}

/// Single shot: any extraction failure or empty match aborts the request.
pub fn extract_ticket_count<E: TextExtractor>(
    extractor: &E,
    parser: &TicketCountParser,
    image: &Path,
) -> Result<u32, OcrError> {
    let text = extractor.extract_text(image)?;
    debug!("Text extracted from {:?}: {:?}", image, text);
    parser.parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedText(&'static str);

    impl TextExtractor for FixedText {
        fn extract_text(&self, _image: &Path) -> Result<String, OcrError> {
            Ok(self.0.to_owned())
        }
    }

    #[test]
    fn first_standalone_digit_wins() {
        let parser = TicketCountParser::default();
        assert_eq!(parser.parse("TICKET 12 x 4 then 3"), Ok(4));
        assert_eq!(parser.parse("passengers: 2"), Ok(2));
    }

    #[test]
    fn digits_outside_range_do_not_match() {
        let parser = TicketCountParser::default();
        assert_eq!(parser.parse("0 6 7 8 9 15"), Err(OcrError::NoMatch));
        assert_eq!(parser.parse(""), Err(OcrError::NoMatch));
    }

    #[test]
    fn custom_range() {
        let parser = TicketCountParser::new(0, 9).unwrap();
        assert_eq!(parser.parse("seat 8"), Ok(8));
        assert_eq!(
            TicketCountParser::new(5, 2).unwrap_err(),
            OcrError::InvalidDigitRange { min: 5, max: 2 }
        );
        assert!(TicketCountParser::new(1, 12).is_err());
    }

    #[test]
    fn extraction_goes_through_the_parser() {
        let parser = TicketCountParser::default();
        let image = Path::new("ticket.png");
        assert_eq!(
            extract_ticket_count(&FixedText("No. 3"), &parser, image),
            Ok(3)
        );
        assert_eq!(
            extract_ticket_count(&FixedText("blurry"), &parser, image),
            Err(OcrError::NoMatch)
        );
    }

    #[test]
    fn missing_program_is_an_extraction_error() {
        let extractor = TesseractExtractor {
            program: "definitely-not-a-tesseract-binary".to_owned(),
            ..TesseractExtractor::default()
        };
        assert!(matches!(
            extractor.extract_text(Path::new("ticket.png")),
            Err(OcrError::Extraction { .. })
        ));
    }
}

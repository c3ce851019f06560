use assert_json_diff::assert_json_eq;
use iab_consent::v1::ConsentString;
use serde::Deserialize;
use std::fs::File;
use std::io;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;

#[derive(Deserialize)]
pub struct TestCase {
    consent_string: String,
    expected: ConsentString,
}

impl TestCase {
    pub fn load_from_file<P: AsRef<Path>>(p: P) -> io::Result<Self> {
        let f = File::open(p)?;
        let tc: Self = serde_json::from_reader(&f)
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, e.to_string()))?;
        Ok(tc)
    }

    pub fn assert_json_matches(&self) {
        let c = match ConsentString::from_str(&self.consent_string) {
            Ok(c) => c,
            Err(e) => panic!("consent string decode error: {:?}", e.to_string()),
        };

        assert_json_eq!(c, self.expected);
    }

    pub fn assert_reencodes(&self) {
        let s = self.expected.to_consent_string();
        assert_eq!(s, self.consent_string);
    }
}

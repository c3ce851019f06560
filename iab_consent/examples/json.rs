use iab_consent::v1::ConsentString;
use std::env::args;
use std::str::FromStr;

fn main() {
    let s = args()
        .nth(1)
        .unwrap_or_else(|| "BOEFEAyOEFEAyAHABDENAI4AAAB9vABAASA".to_string());

    let consent = match ConsentString::from_str(&s) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            match e.into_partial() {
                Some(partial) => partial,
                None => return,
            }
        }
    };

    println!("{}", serde_json::to_string_pretty(&consent).unwrap());
}

//! Regex patterns for card field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Two consecutive alphabetic words separated by a single space
    pub static ref NAME: Regex = Regex::new(
        r"[A-Za-z]+ [A-Za-z]+"
    ).unwrap();

    // local@domain.tld with a 2-4 letter TLD
    pub static ref EMAIL: Regex = Regex::new(
        r"[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,4}"
    ).unwrap();

    // Optional +, 2-3 digit prefix, then two 5-digit groups with optional separators.
    // Groups: 1 = prefix, 2 = first separator, 3 = second separator.
    pub static ref PHONE: Regex = Regex::new(
        r"\+?([0-9]{2,3})([- ]?)[0-9]{5}([- ]?)[0-9]{5}"
    ).unwrap();

    // First maximal run of ASCII digits
    pub static ref DIGIT_RUN: Regex = Regex::new(
        r"[0-9]+"
    ).unwrap();
}

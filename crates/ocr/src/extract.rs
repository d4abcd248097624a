use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use tillscan_core::{amount_string, ReceiptItem, ReceiptRecord};

use crate::types::{AmountCandidate, OcrLine};

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_pound, r"£\s*([0-9,]+\.?[0-9]*)");
re!(re_dollar, r"\$\s*([0-9,]+\.?[0-9]*)");
re!(re_bare_decimal, r"([0-9,]+\.[0-9]{2})");

// A bare date/number line, disqualified as a vendor name.
re!(re_numeric_only, r"^[0-9/.-]+$");

re!(re_time_ampm, r"\d{1,2}:\d{2}\s*[APap][Mm]");
re!(re_time_seconds, r"\d{1,2}:\d{2}:\d{2}");
re!(re_time_hm, r"\d{1,2}:\d{2}");

re!(re_date_slash, r"\d{1,2}/\d{1,2}/\d{4}");
re!(re_date_dash, r"\d{1,2}-\d{1,2}-\d{4}");
re!(re_date_month, r"[A-Za-z]{3}\s+\d{1,2},?\s+\d{4}");

re!(re_phone_line, r"^\d{3}[-.]?\d{3}[-.]?\d{4}$");
re!(re_embedded_date, r"\d{1,2}[/-]\d{1,2}[/-]\d{4}");

// Brand-specific layout assumption for the pilot vendor's receipts:
// the date line reads like "Sunday, January 5 2025".
const DATE_LINE_PREFIX: &str = "Sunday";
const DATE_LINE_SUFFIX: &str = "2025";

const BRAND_KEYWORD: &str = "starbucks";
const ADDRESS_KEYWORDS: [&str; 6] = ["street", "st", "ave", "avenue", "road", "rd"];
const RAW_TEXT_SEPARATOR: &str = " | ";

// ── Public extraction API ─────────────────────────────────────────────────────

pub struct Extractor;

impl Extractor {
    /// Run every heuristic pass over the normalized line sequence and build
    /// the receipt record. Pass order matters: the address pass may
    /// overwrite the vendor name, and the raw-text filter reads the final
    /// resolved fields, so it always runs last.
    pub fn extract(lines: &[OcrLine]) -> ReceiptRecord {
        let mut record = ReceiptRecord::default();

        if let Some(vendor) = Self::detect_vendor(lines) {
            record.vendor_name = vendor;
        }

        let amounts = Self::scan_amounts(lines);
        Self::classify_amounts(lines, &amounts, &mut record);
        Self::detect_date_time(lines, &mut record);
        Self::detect_address(lines, &mut record);
        record.items = Self::build_items(lines, &amounts);
        record.raw_text = Self::filter_raw_text(lines, &record);

        record
    }

    // ── Vendor ────────────────────────────────────────────────────────────────

    /// First of the first five lines that is longer than two characters and
    /// not a bare date/number.
    fn detect_vendor(lines: &[OcrLine]) -> Option<String> {
        lines
            .iter()
            .take(5)
            .find(|l| l.text.chars().count() > 2 && !re_numeric_only().is_match(&l.text))
            .map(|l| l.text.clone())
    }

    // ── Amounts ───────────────────────────────────────────────────────────────

    /// Collect every monetary candidate per line: pound matches first, then
    /// dollar, then bare two-decimal tokens. A line matching both a currency
    /// pattern and the bare-decimal pattern yields duplicate candidates;
    /// that duplication flows through to the item list unchanged.
    fn scan_amounts(lines: &[OcrLine]) -> Vec<AmountCandidate> {
        let mut amounts = Vec::new();
        for line in lines {
            for re in [re_pound(), re_dollar(), re_bare_decimal()] {
                for caps in re.captures_iter(&line.text) {
                    let Some(m) = caps.get(1) else { continue };
                    let clean = m.as_str().replace(',', "");
                    let Ok(value) = Decimal::from_str(&clean) else { continue };
                    if value > Decimal::ZERO {
                        amounts.push(AmountCandidate { value, line_index: line.index });
                    }
                }
            }
        }
        amounts
    }

    /// Assign total/subtotal/tax from labeled source lines, in candidate
    /// order. Total is first-match-wins; subtotal and tax overwrite on every
    /// match. The total check runs first, so while total is unset a
    /// "subtotal" line claims the total slot ("total" is a substring).
    /// Fallback: the first-occurring maximum candidate becomes the total.
    fn classify_amounts(lines: &[OcrLine], amounts: &[AmountCandidate], record: &mut ReceiptRecord) {
        for candidate in amounts {
            let lower = lines[candidate.line_index].text.to_lowercase();

            if lower.contains("total") && record.total_amount.is_none() {
                record.total_amount = Some(amount_string(candidate.value));
            } else if lower.contains("subtotal") || lower.contains("sub total") {
                record.subtotal = Some(amount_string(candidate.value));
            } else if lower.contains("tax") {
                record.tax_amount = Some(amount_string(candidate.value));
            }
        }

        if record.total_amount.is_none() {
            let mut largest: Option<&AmountCandidate> = None;
            for candidate in amounts {
                if largest.map_or(true, |l| candidate.value > l.value) {
                    largest = Some(candidate);
                }
            }
            if let Some(l) = largest {
                record.total_amount = Some(amount_string(l.value));
            }
        }
    }

    // ── Date & time ───────────────────────────────────────────────────────────

    fn detect_date_time(lines: &[OcrLine], record: &mut ReceiptRecord) {
        for (i, line) in lines.iter().enumerate() {
            if line.text.starts_with(DATE_LINE_PREFIX) && line.text.ends_with(DATE_LINE_SUFFIX) {
                record.date = line.text.clone();

                // Time sits on the line directly below the date. The whole
                // line is taken once any time pattern matches it.
                if let Some(next) = lines.get(i + 1) {
                    for re in [re_time_ampm(), re_time_seconds(), re_time_hm()] {
                        if re.is_match(&next.text) {
                            record.time = next.text.clone();
                            break;
                        }
                    }
                }
                break;
            }
        }

        if record.date.is_empty() {
            'lines: for line in lines {
                for re in [re_date_slash(), re_date_dash(), re_date_month()] {
                    if let Some(m) = re.find(&line.text) {
                        record.date = m.as_str().trim().to_string();
                        break 'lines;
                    }
                }
            }
        }
    }

    // ── Address ───────────────────────────────────────────────────────────────

    /// Tier 1: the first line mentioning the brand keyword overwrites the
    /// vendor name, and the line below it becomes the address unless it
    /// looks like a phone number or carries an embedded date. Tier 2 runs
    /// only when tier 1 never matched: the first line containing a street
    /// keyword becomes the address.
    fn detect_address(lines: &[OcrLine], record: &mut ReceiptRecord) {
        let mut vendor_found = false;
        for (i, line) in lines.iter().enumerate() {
            if line.text.to_lowercase().contains(BRAND_KEYWORD) {
                record.vendor_name = line.text.clone();
                if let Some(next) = lines.get(i + 1) {
                    if !re_phone_line().is_match(&next.text)
                        && !re_embedded_date().is_match(&next.text)
                    {
                        record.address = next.text.clone();
                    }
                }
                vendor_found = true;
                break;
            }
        }

        if !vendor_found && record.address.is_empty() {
            for line in lines {
                let lower = line.text.to_lowercase();
                if ADDRESS_KEYWORDS.iter().any(|k| lower.contains(k)) {
                    record.address = line.text.clone();
                    break;
                }
            }
        }
    }

    // ── Items ─────────────────────────────────────────────────────────────────

    /// Every candidate whose source line carries no total/tax/subtotal label
    /// becomes one item. Iteration is per-amount, not per-line, so a line
    /// with two candidates produces two items with the same description.
    fn build_items(lines: &[OcrLine], amounts: &[AmountCandidate]) -> Vec<ReceiptItem> {
        amounts
            .iter()
            .filter_map(|candidate| {
                let line = &lines[candidate.line_index].text;
                let lower = line.to_lowercase();
                if ["total", "tax", "subtotal"].iter().any(|w| lower.contains(w)) {
                    return None;
                }
                Some(ReceiptItem {
                    description: line.clone(),
                    amount: amount_string(candidate.value),
                })
            })
            .collect()
    }

    // ── Raw text ──────────────────────────────────────────────────────────────

    /// Join every line not already classified into a field. The "total"
    /// substring check also drops subtotal lines, while lines mentioning
    /// only tax survive; downstream consumers rely on that asymmetry.
    fn filter_raw_text(lines: &[OcrLine], record: &ReceiptRecord) -> String {
        let kept: Vec<&str> = lines
            .iter()
            .filter(|line| {
                let lower = line.text.to_lowercase();
                !(line.text == record.vendor_name
                    || (!record.date.is_empty() && line.text.contains(&record.date))
                    || (!record.time.is_empty() && line.text.contains(&record.time))
                    || (!record.address.is_empty() && line.text == record.address)
                    || lower.contains("total"))
            })
            .map(|line| line.text.as_str())
            .collect();
        kept.join(RAW_TEXT_SEPARATOR)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

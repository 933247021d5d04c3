//! Built-in spreadsheet functions and their metadata.
//!
//! Conventions:
//! - Spreadsheet-facing names are ALL CAPS (`SUM`, `REMOVE_DUPLICATES`);
//!   calls are matched case-insensitively.
//! - Every function receives its raw argument text and interprets it itself,
//!   the way each function's contract describes.
//! - Table functions return their rows as JSON text (`[["a","b"]]`).
//! - If you add a new built-in, list it in `BUILTINS` and dispatch it in `call`.

use std::collections::HashMap;

use crate::engine::{ERROR, Sheet, format_number, parse_float_or_nan, range_numbers, range_rows, resolve_argument};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuiltinKind {
    /// Numeric reduction over a range or an argument list.
    Aggregate,
    /// Text transform of a single argument.
    Text,
    /// Row-wise transform of a range, returned as JSON.
    Table,
}

#[derive(Debug)]
pub struct Builtin {
    pub name: &'static str,
    pub kind: BuiltinKind,
    /// One-line summary shown in `--help`.
    pub description: &'static str,
}

pub const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "SUM",
        kind: BuiltinKind::Aggregate,
        description: "Sum of the values; non-numeric values count as 0",
    },
    Builtin {
        name: "AVERAGE",
        kind: BuiltinKind::Aggregate,
        description: "Mean of the numeric values, 0 when there are none",
    },
    Builtin {
        name: "MAX",
        kind: BuiltinKind::Aggregate,
        description: "Largest numeric value",
    },
    Builtin {
        name: "MIN",
        kind: BuiltinKind::Aggregate,
        description: "Smallest numeric value",
    },
    Builtin {
        name: "COUNT",
        kind: BuiltinKind::Aggregate,
        description: "Number of numeric values",
    },
    Builtin {
        name: "MEDIAN",
        kind: BuiltinKind::Aggregate,
        description: "Middle numeric value, 0 when there are none",
    },
    Builtin {
        name: "MODE",
        kind: BuiltinKind::Aggregate,
        description: "Most frequent numeric value, empty when there are none",
    },
    Builtin {
        name: "TRIM",
        kind: BuiltinKind::Text,
        description: "Strip surrounding whitespace",
    },
    Builtin {
        name: "UPPER",
        kind: BuiltinKind::Text,
        description: "Convert to upper case",
    },
    Builtin {
        name: "LOWER",
        kind: BuiltinKind::Text,
        description: "Convert to lower case",
    },
    Builtin {
        name: "REMOVE_DUPLICATES",
        kind: BuiltinKind::Table,
        description: "Rows of a range with repeated rows removed",
    },
    Builtin {
        name: "FIND_AND_REPLACE",
        kind: BuiltinKind::Table,
        description: "Rows of a range with every occurrence of a text replaced",
    },
];

pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name.eq_ignore_ascii_case(name))
}

/// Call the built-in `name` (upper case) with its raw argument text.
pub(crate) fn call(name: &str, args: &str, sheet: &Sheet) -> String {
    let Some(builtin) = lookup(name) else {
        log::trace!("unknown function {}", name);
        return ERROR.to_string();
    };
    match builtin.kind {
        BuiltinKind::Aggregate => aggregate(builtin.name, &aggregate_inputs(args, sheet)),
        BuiltinKind::Text => {
            let text = resolve_argument(args, sheet);
            match builtin.name {
                "TRIM" => text.trim().to_string(),
                "UPPER" => text.to_uppercase(),
                "LOWER" => text.to_lowercase(),
                _ => ERROR.to_string(),
            }
        }
        BuiltinKind::Table => match builtin.name {
            "REMOVE_DUPLICATES" => to_json(&remove_duplicates(range_rows(args, sheet))),
            "FIND_AND_REPLACE" => find_and_replace_call(args, sheet),
            _ => ERROR.to_string(),
        },
    }
}

/// A range argument expands to numbers (non-numeric as 0); otherwise each
/// comma-separated argument is resolved and parsed, unparseable ones as NaN.
fn aggregate_inputs(args: &str, sheet: &Sheet) -> Vec<f64> {
    if args.contains(':') {
        range_numbers(args, sheet)
    } else {
        args.split(',')
            .map(|arg| parse_float_or_nan(&resolve_argument(arg, sheet)))
            .collect()
    }
}

fn aggregate(name: &str, values: &[f64]) -> String {
    let nums: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    match name {
        "SUM" => format_number(nums.iter().sum()),
        "AVERAGE" => {
            if nums.is_empty() {
                "0".to_string()
            } else {
                format_number(nums.iter().sum::<f64>() / nums.len() as f64)
            }
        }
        "MAX" => nums
            .iter()
            .copied()
            .reduce(f64::max)
            .map(format_number)
            .unwrap_or_else(|| ERROR.to_string()),
        "MIN" => nums
            .iter()
            .copied()
            .reduce(f64::min)
            .map(format_number)
            .unwrap_or_else(|| ERROR.to_string()),
        "COUNT" => nums.len().to_string(),
        "MEDIAN" => median(nums),
        "MODE" => mode(&nums),
        _ => ERROR.to_string(),
    }
}

fn median(mut nums: Vec<f64>) -> String {
    if nums.is_empty() {
        return "0".to_string();
    }
    nums.sort_by(f64::total_cmp);
    let mid = nums.len() / 2;
    let median = if nums.len() % 2 != 0 {
        nums[mid]
    } else {
        (nums[mid - 1] + nums[mid]) / 2.0
    };
    format_number(median)
}

/// Keys that read as array indices (`"0"`, `"7"`) are visited first in
/// ascending order, every other key afterwards in first-seen order.
fn index_key(n: f64) -> Option<u32> {
    if n.fract() == 0.0 && n >= 0.0 && n < u32::MAX as f64 {
        Some(n as u32)
    } else {
        None
    }
}

/// Most frequent value. Values are tallied under their display text and the
/// first key, in visiting order, to reach a strictly higher count wins.
fn mode(nums: &[f64]) -> String {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut index_keys: Vec<(u32, String)> = Vec::new();
    let mut other_keys: Vec<String> = Vec::new();

    for &n in nums {
        let key = format_number(n);
        let count = counts.entry(key.clone()).or_insert(0);
        if *count == 0 {
            match index_key(n) {
                Some(idx) => index_keys.push((idx, key)),
                None => other_keys.push(key),
            }
        }
        *count += 1;
    }

    index_keys.sort_by_key(|(idx, _)| *idx);

    let mut best: Option<&str> = None;
    let mut best_count = 0;
    let visiting = index_keys.iter().map(|(_, key)| key).chain(other_keys.iter());
    for key in visiting {
        let count = counts[key];
        if count > best_count {
            best_count = count;
            best = Some(key);
        }
    }
    best.map(str::to_string).unwrap_or_default()
}

/// Drop repeated rows, keeping the first occurrence of each.
fn remove_duplicates(rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let mut unique: Vec<Vec<String>> = Vec::with_capacity(rows.len());
    for row in rows {
        if !unique.contains(&row) {
            unique.push(row);
        }
    }
    unique
}

fn find_and_replace_call(args: &str, sheet: &Sheet) -> String {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return ERROR.to_string();
    }
    let search = resolve_argument(parts[0], sheet);
    let replacement = resolve_argument(parts[1], sheet);
    let rows = range_rows(parts[2], sheet)
        .into_iter()
        .map(|row| {
            row.iter()
                .map(|cell| replace_all(cell, &search, &replacement))
                .collect()
        })
        .collect::<Vec<Vec<String>>>();
    to_json(&rows)
}

/// Replace every occurrence of `search`. An empty search puts the
/// replacement between characters (`"abc"` -> `"aXbXc"`).
fn replace_all(text: &str, search: &str, replacement: &str) -> String {
    if search.is_empty() {
        let chars: Vec<String> = text.chars().map(String::from).collect();
        return chars.join(replacement);
    }
    text.replace(search, replacement)
}

fn to_json(rows: &[Vec<String>]) -> String {
    serde_json::to_string(rows).unwrap_or_else(|_| ERROR.to_string())
}

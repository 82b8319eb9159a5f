//! Solver for a single linear size equation:
//! `total = width(a) + width(b) + ...` with at most one unknown width.

/// The unknown term of an equation and the width that satisfies it.
///
/// `width` is negative when the known terms already exceed the total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unknown<'a> {
    pub name: &'a str,
    pub width: i128,
}

/// More than one term of the equation is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguous {
    pub unknowns: Vec<String>,
}

/// Solves `total = sum(terms)` where `None` marks an unknown width.
///
/// Returns `Ok(None)` when every width is known.
pub fn solve_sum<'a>(
    terms: &[(&'a str, Option<usize>)],
    total: u64,
) -> Result<Option<Unknown<'a>>, Ambiguous> {
    let mut known: i128 = 0;
    let mut unknowns = Vec::new();

    for (name, width) in terms {
        match width {
            Some(width) => known += *width as i128,
            None => unknowns.push(*name),
        }
    }

    match unknowns.as_slice() {
        [] => Ok(None),
        [name] => Ok(Some(Unknown {
            name: *name,
            width: total as i128 - known,
        })),
        _ => Err(Ambiguous {
            unknowns: unknowns.into_iter().map(str::to_string).collect(),
        }),
    }
}

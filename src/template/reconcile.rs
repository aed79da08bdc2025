/// Outcome of comparing what an editable surface shows with what it should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    Unchanged,
    Patch(Patch),
}

/// Replace `current[start..end]` with `replacement`. Offsets are byte offsets on char
/// boundaries of the current rendered form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

impl Patch {
    pub fn apply(&self, current: &str) -> String {
        let mut patched = String::with_capacity(current.len() + self.replacement.len());
        patched.push_str(&current[..self.start]);
        patched.push_str(&self.replacement);
        patched.push_str(&current[self.end..]);
        patched
    }
}

/// Computes the smallest single splice that turns `current` into `desired`, or `Unchanged`
/// when the surface is already up to date.
pub fn reconcile(current: &str, desired: &str) -> Reconciliation {
    if current == desired {
        return Reconciliation::Unchanged;
    }

    let prefix = common_prefix_len(current, desired);
    let suffix = common_suffix_len(&current[prefix..], &desired[prefix..]);

    Reconciliation::Patch(Patch {
        start: prefix,
        end: current.len() - suffix,
        replacement: desired[prefix..desired.len() - suffix].to_string(),
    })
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map(|((idx, _), _)| idx)
        .unwrap_or_else(|| a.len().min(b.len()))
}

fn common_suffix_len(a: &str, b: &str) -> usize {
    a.chars()
        .rev()
        .zip(b.chars().rev())
        .take_while(|(ca, cb)| ca == cb)
        .map(|(ca, _)| ca.len_utf8())
        .sum()
}

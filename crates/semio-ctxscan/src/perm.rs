//! Permutation enumeration
//!
//! Distinct permutations of an operator window, in a canonical order:
//! lexicographic over operator composition strings, so re-running a
//! scan on identical inputs yields a byte-identical report.

use semio_ast::Operator;

/// All distinct permutations of `ops`, deduplicated by rendered
/// operator identity and generated in lexicographic composition-string
/// order.
pub fn distinct_permutations(ops: &[Operator]) -> Vec<Vec<Operator>> {
    if ops.len() <= 1 {
        return vec![ops.to_vec()];
    }

    // Sorting by key up front makes the skip-duplicates recursion emit
    // distinct permutations directly in lexicographic order.
    let mut keyed: Vec<(String, Operator)> =
        ops.iter().map(|op| (op.to_string(), *op)).collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    let mut out = Vec::new();
    let mut current = Vec::with_capacity(ops.len());
    let mut used = vec![false; ops.len()];
    build(&keyed, &mut used, &mut current, &mut out);
    out
}

fn build(
    keyed: &[(String, Operator)],
    used: &mut [bool],
    current: &mut Vec<Operator>,
    out: &mut Vec<Vec<Operator>>,
) {
    if current.len() == keyed.len() {
        out.push(current.clone());
        return;
    }
    for i in 0..keyed.len() {
        if used[i] {
            continue;
        }
        // Equal operators: only the first unused one may start a branch
        if i > 0 && keyed[i].0 == keyed[i - 1].0 && !used[i - 1] {
            continue;
        }
        used[i] = true;
        current.push(keyed[i].1);
        build(keyed, used, current, out);
        current.pop();
        used[i] = false;
    }
}

/// Number of distinct permutations without materializing them:
/// factorial of the window length divided by repeats. Used for budget
/// checks before enumeration. Saturates instead of overflowing, which
/// any sane budget rejects anyway.
pub fn distinct_count(ops: &[Operator]) -> usize {
    let mut keys: Vec<String> = ops.iter().map(|op| op.to_string()).collect();
    keys.sort();

    let mut count = factorial(ops.len());
    let mut run = 1usize;
    for i in 1..keys.len() {
        if keys[i] == keys[i - 1] {
            run += 1;
        } else {
            count /= factorial(run);
            run = 1;
        }
    }
    if !keys.is_empty() {
        count /= factorial(run);
    }
    count
}

fn factorial(n: usize) -> usize {
    (1..=n)
        .try_fold(1usize, |acc, k| acc.checked_mul(k))
        .unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_distinct_ops_give_two_perms() {
        let perms = distinct_permutations(&[
            Operator::Add { arg: 0.5 },
            Operator::Sign,
        ]);
        assert_eq!(perms.len(), 2);
        // Lexicographic: Add(0.5)>>Sign before Sign>>Add(0.5)
        assert_eq!(perms[0][0], Operator::Add { arg: 0.5 });
        assert_eq!(perms[1][0], Operator::Sign);
    }

    #[test]
    fn test_duplicate_ops_deduplicated() {
        let ops = [
            Operator::Add { arg: 0.1 },
            Operator::Add { arg: 0.1 },
        ];
        assert_eq!(distinct_permutations(&ops).len(), 1);
        assert_eq!(distinct_count(&ops), 1);
    }

    #[test]
    fn test_singleton_window_has_one_perm() {
        let perms = distinct_permutations(&[Operator::Sign]);
        assert_eq!(perms.len(), 1);
    }

    #[test]
    fn test_distinct_count_matches_enumeration() {
        let ops = [
            Operator::Add { arg: 0.1 },
            Operator::Add { arg: 0.1 },
            Operator::Sign,
        ];
        assert_eq!(distinct_count(&ops), distinct_permutations(&ops).len());
        assert_eq!(distinct_count(&ops), 3);
    }

    #[test]
    fn test_lexicographic_order() {
        let perms = distinct_permutations(&[
            Operator::Sign,
            Operator::JitterU { arg: 0.1 },
            Operator::Add { arg: 1.0 },
        ]);
        assert_eq!(perms.len(), 6);
        let rendered: Vec<String> = perms
            .iter()
            .map(|p| {
                p.iter()
                    .map(|op| op.to_string())
                    .collect::<Vec<_>>()
                    .join(">>")
            })
            .collect();
        let mut sorted = rendered.clone();
        sorted.sort();
        assert_eq!(rendered, sorted);
        assert_eq!(rendered[0], "Add(1)>>JitterU(0.1)>>Sign");
    }
}

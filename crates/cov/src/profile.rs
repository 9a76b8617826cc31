//! Substitution profiles of aligned sequence pairs.

use crate::errors::CovError;

/// Build the substitution profile of two aligned sequences.
///
/// Site `i` of the profile is `1.0` when the sequences differ at `i` and
/// `0.0` otherwise. Both sequences must have the same length.
///
/// # Examples
///
/// ```
/// use simmlst_cov::profile::sub_profile;
///
/// let subs = sub_profile(b"ACGT", b"ACCA").unwrap();
/// assert_eq!(subs, vec![0.0, 0.0, 1.0, 1.0]);
/// ```
pub fn sub_profile(a: &[u8], b: &[u8]) -> Result<Vec<f64>, CovError> {
    if a.len() != b.len() {
        return Err(CovError::LengthMismatch {
            len1: a.len(),
            len2: b.len(),
        });
    }

    Ok(a.iter()
        .zip(b)
        .map(|(x, y)| if x == y { 0.0 } else { 1.0 })
        .collect())
}

/// Visit the substitution profile of every unordered pair `(i, j)`, `i < j`.
///
/// Pairs are visited in row-major order. The first failing pair aborts the
/// walk and its error is returned.
pub fn for_each_pair<S, F>(sequences: &[S], mut f: F) -> Result<(), CovError>
where
    S: AsRef<[u8]>,
    F: FnMut(&[f64]),
{
    for i in 0..sequences.len() {
        for j in (i + 1)..sequences.len() {
            let subs = sub_profile(sequences[i].as_ref(), sequences[j].as_ref())?;
            f(&subs);
        }
    }
    Ok(())
}

/// Number of unordered pairs among `n` sequences.
#[inline]
pub fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_profile_identical() {
        let subs = sub_profile(b"AAAA", b"AAAA").unwrap();
        assert!(subs.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_sub_profile_marks_differences() {
        let subs = sub_profile(b"ACGTAC", b"TCGAAG").unwrap();
        assert_eq!(subs, vec![1.0, 0.0, 0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_sub_profile_length_mismatch() {
        let err = sub_profile(b"ACG", b"AC").unwrap_err();
        assert_eq!(err, CovError::LengthMismatch { len1: 3, len2: 2 });
    }

    #[test]
    fn test_for_each_pair_visits_all_pairs() {
        let seqs = vec![b"AA".to_vec(), b"AT".to_vec(), b"TT".to_vec()];
        let mut seen = Vec::new();
        for_each_pair(&seqs, |subs| seen.push(subs.to_vec())).unwrap();
        assert_eq!(seen.len(), pair_count(3));
        assert_eq!(seen[0], vec![0.0, 1.0]);
        assert_eq!(seen[1], vec![1.0, 1.0]);
        assert_eq!(seen[2], vec![1.0, 0.0]);
    }

    #[test]
    fn test_for_each_pair_propagates_mismatch() {
        let seqs = vec![b"AAA".to_vec(), b"AA".to_vec()];
        assert!(for_each_pair(&seqs, |_| {}).is_err());
    }

    #[test]
    fn test_pair_count() {
        assert_eq!(pair_count(0), 0);
        assert_eq!(pair_count(1), 0);
        assert_eq!(pair_count(10), 45);
    }
}

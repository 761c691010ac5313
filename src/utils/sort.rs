/// Stable LSD radix sort of a sparse row stored as SoA (term indices / counts).
/// - Sorts `inds` ascending
/// - Moves `vals` along with their index
///
/// Complexity: 4 passes, each O(n + 256)
pub fn radix_sort_u32_soa<N: Copy + Default>(inds: &mut [u32], vals: &mut [N]) {
    assert_eq!(inds.len(), vals.len());
    let n = inds.len();
    if n <= 1 {
        return;
    }

    // small rows are the common case for short documents
    if n <= 32 {
        insertion_sort_u32_soa(inds, vals);
        return;
    }

    let mut inds_tmp = vec![0u32; n];
    let mut vals_tmp = vec![N::default(); n];

    for shift in [0u32, 8, 16, 24] {
        let mut count = [0usize; 256];
        for &k in inds.iter() {
            count[((k >> shift) & 0xFF) as usize] += 1;
        }
        // skip passes where every key shares the same byte
        if count.iter().any(|&c| c == n) {
            continue;
        }

        let mut sum = 0usize;
        for c in count.iter_mut() {
            let tmp = *c;
            *c = sum;
            sum += tmp;
        }

        for (&k, &v) in inds.iter().zip(vals.iter()) {
            let b = ((k >> shift) & 0xFF) as usize;
            let pos = count[b];
            count[b] += 1;
            inds_tmp[pos] = k;
            vals_tmp[pos] = v;
        }

        inds.copy_from_slice(&inds_tmp);
        vals.copy_from_slice(&vals_tmp);
    }
}

fn insertion_sort_u32_soa<N: Copy>(inds: &mut [u32], vals: &mut [N]) {
    for i in 1..inds.len() {
        let mut j = i;
        while j > 0 && inds[j] < inds[j - 1] {
            inds.swap(j, j - 1);
            vals.swap(j, j - 1);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// sort by key, equal keys keep their original order
    fn baseline(inds: &[u32], vals: &[u64]) -> (Vec<u32>, Vec<u64>) {
        let mut pairs: Vec<(u32, u64)> = inds.iter().copied().zip(vals.iter().copied()).collect();
        pairs.sort_by_key(|p| p.0);
        pairs.into_iter().unzip()
    }

    /// xorshift32
    struct Rng(u32);
    impl Rng {
        fn next_u32(&mut self) -> u32 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            self.0 = x;
            x
        }
    }

    #[test]
    fn empty_and_single() {
        let mut inds: Vec<u32> = vec![];
        let mut vals: Vec<u64> = vec![];
        radix_sort_u32_soa(&mut inds, &mut vals);
        assert!(inds.is_empty());

        let mut inds = vec![42u32];
        let mut vals = vec![7u64];
        radix_sort_u32_soa(&mut inds, &mut vals);
        assert_eq!((inds, vals), (vec![42], vec![7]));
    }

    #[test]
    fn matches_stable_baseline_across_sizes() {
        let mut rng = Rng(0x1234_5678);
        for &n in &[2usize, 7, 31, 32, 33, 64, 129, 1024] {
            let inds: Vec<u32> = (0..n).map(|_| rng.next_u32() & 0x00FF_FFFF).collect();
            let vals: Vec<u64> = (0..n as u64).collect();
            let (want_k, want_v) = baseline(&inds, &vals);

            let (mut got_k, mut got_v) = (inds.clone(), vals.clone());
            radix_sort_u32_soa(&mut got_k, &mut got_v);
            assert_eq!(got_k, want_k, "keys mismatch at n={n}");
            assert_eq!(got_v, want_v, "vals mismatch at n={n}");
        }
    }

    #[test]
    fn extremes() {
        let mut inds: Vec<u32> = vec![0, u32::MAX, 1, u32::MAX - 1, 0, 2, u32::MAX];
        inds.extend((0..40).rev());
        let vals: Vec<u64> = (0..inds.len() as u64).collect();
        let (want_k, want_v) = baseline(&inds, &vals);
        let mut got_v = vals.clone();
        radix_sort_u32_soa(&mut inds, &mut got_v);
        assert_eq!(inds, want_k);
        assert_eq!(got_v, want_v);
    }
}

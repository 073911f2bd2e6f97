//! Prime capacities for the slot array.
//!
//! Double hashing visits every slot only when the table length is prime, so
//! every capacity the engine allocates comes from [`next_prime`].

/// Ascending primes used as table capacities. Dense below 64, then roughly
/// 12.5% apart up to the largest prime below 2^32.
pub const PRIMES: &[u64] = &[
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 71, 83, 97, 113,
    131, 149, 173, 197, 223, 251, 283, 331, 373, 421, 479, 541, 613, 691, 787, 887,
    1_009, 1_151, 1_297, 1_471, 1_657, 1_867, 2_111, 2_377, 2_677, 3_019, 3_407,
    3_833, 4_327, 4_871, 5_483, 6_173, 6_947, 7_817, 8_803, 9_907, 11_149, 12_547,
    14_143, 15_913, 17_903, 20_143, 22_669, 25_523, 28_723, 32_321, 36_373, 40_927,
    46_049, 51_817, 58_309, 65_599, 73_819, 83_047, 93_463, 105_167, 118_343,
    133_153, 149_803, 168_533, 189_613, 213_319, 239_999, 270_001, 303_767, 341_743,
    384_469, 432_539, 486_617, 547_453, 615_887, 692_893, 779_507, 876_947, 986_567,
    1_109_891, 1_248_631, 1_404_721, 1_580_339, 1_777_891, 2_000_143, 2_250_163,
    2_531_443, 2_847_893, 3_203_909, 3_604_417, 4_054_987, 4_561_877, 5_132_117,
    5_773_679, 6_495_389, 7_307_323, 8_220_743, 9_248_339, 10_404_403, 11_704_963,
    13_168_091, 14_814_103, 16_665_881, 18_749_123, 21_092_779, 23_729_411,
    26_695_609, 30_032_573, 33_786_659, 38_010_019, 42_761_287, 48_106_453,
    54_119_761, 60_884_741, 68_495_347, 77_057_297, 86_689_469, 97_525_661,
    109_716_379, 123_430_961, 138_859_837, 156_217_333, 175_744_531, 197_712_607,
    222_426_683, 250_230_023, 281_508_827, 316_697_431, 356_284_619, 400_820_209,
    450_922_753, 507_288_107, 570_699_121, 642_036_517, 722_291_083, 812_577_517,
    914_149_741, 1_028_418_463, 1_156_970_821, 1_301_592_203, 1_464_291_239,
    1_647_327_679, 1_853_243_677, 2_084_899_139, 2_345_511_541, 2_638_700_497,
    2_968_538_081, 3_339_605_383, 3_757_056_091, 4_226_688_133, 4_294_967_291,
];

/// Smallest capacity ever returned. Double hashing needs `capacity - 2 >= 1`.
pub const MIN_PRIME: usize = PRIMES[0] as usize;

/// Returns the smallest tabulated prime `>= n`.
///
/// Past the end of the table the search continues upward one candidate at a
/// time. Values at or below the smallest entry map to [`MIN_PRIME`].
pub fn next_prime(n: usize) -> usize {
    let wanted = n as u64;
    let idx = PRIMES.partition_point(|&p| p < wanted);
    if let Some(&p) = PRIMES.get(idx) {
        return p as usize;
    }

    let mut candidate = wanted | 1;
    while !is_prime(candidate) {
        match candidate.checked_add(2) {
            Some(next) => candidate = next,
            None => return usize::MAX,
        }
    }
    usize::try_from(candidate).unwrap_or(usize::MAX)
}

/// Trial-division primality test.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3u64;
    while d <= n / d {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: the table is strictly ascending and holds only primes.
    #[test]
    fn table_is_sorted_primes() {
        assert!(PRIMES.windows(2).all(|w| w[0] < w[1]));
        assert!(PRIMES.iter().all(|&p| is_prime(p)));
    }

    /// Invariant: small and non-positive requests map to the smallest prime.
    #[test]
    fn tiny_requests() {
        assert_eq!(PRIMES[0], 3);
        assert_eq!(MIN_PRIME, 3);
        assert_eq!(next_prime(0), 3);
        assert_eq!(next_prime(0), MIN_PRIME);
        assert_eq!(next_prime(1), MIN_PRIME);
        assert_eq!(next_prime(3), 3);
    }

    /// Invariant: tabulated primes map to themselves; others round up.
    #[test]
    fn rounds_up_to_table_entry() {
        assert_eq!(next_prime(11), 11);
        assert_eq!(next_prime(12), 13);
        assert_eq!(next_prime(22), 23);
        assert_eq!(next_prime(1001), 1009);
        for n in [64usize, 100, 5_000, 1 << 20, 1 << 24] {
            let p = next_prime(n);
            assert!(p >= n);
            assert!(is_prime(p as u64));
        }
    }

    /// Invariant: requests past the table fall back to a sequential search.
    #[cfg(target_pointer_width = "64")]
    #[test]
    fn beyond_table() {
        let last = *PRIMES.last().unwrap() as usize;
        let p = next_prime(last + 1);
        assert!(p > last);
        assert!(is_prime(p as u64));
        // 2^32 + 15 is the first prime above 2^32.
        assert_eq!(next_prime(1 << 32), (1usize << 32) + 15);
    }

    #[test]
    fn primality() {
        let primes: Vec<u64> = (0..30).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
        assert!(!is_prime(4_294_967_297)); // 641 * 6700417
    }
}

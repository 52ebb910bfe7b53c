/// Enumerate primes in `2..=limit` by trial division against the primes found so far
pub fn primes(limit: u64) -> Vec<u64> {
    let mut found: Vec<u64> = Vec::new();
    for candidate in 2..=limit {
        let is_prime = found
            .iter()
            .take_while(|&&p| p * p <= candidate)
            .all(|&p| candidate % p != 0);
        if is_prime {
            found.push(candidate);
        }
    }
    found
}

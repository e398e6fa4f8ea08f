use rand::Rng;

/// Generate a match-room code in the `CLUTCH-####-VAULT` format.
///
/// Codes are per-team secrets handed to the leader once at registration,
/// not globally unique identifiers; collisions across teams are tolerated.
pub fn generate() -> String {
    let digits: u16 = rand::thread_rng().gen_range(1000..=9999);
    format!("CLUTCH-{digits}-VAULT")
}

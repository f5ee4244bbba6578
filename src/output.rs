use std::io::Write;

use crate::domain::Result;
use crate::ledger::Ledger;

/// Writes one CSV row per account, ordered by id.
pub fn write_summary<W: Write>(ledger: &Ledger, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for summary in ledger.summaries()? {
        wtr.serialize(summary)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountId, Deltas, Money, Protocol};

    #[test]
    fn writes_header_and_sorted_rows() {
        let mut ledger = Ledger::new();
        let (alice, bob) = (AccountId::new("alice"), AccountId::new("bob"));
        ledger.register(&bob).unwrap();
        ledger.register(&alice).unwrap();
        ledger.deposit(&bob, Money(200)).unwrap();
        ledger
            .set_trust(&bob, &Deltas::from([(alice.clone(), Money(50))]))
            .unwrap();
        ledger
            .borrow(&alice, &Deltas::from([(bob.clone(), Money(50))]))
            .unwrap();

        let mut out = Vec::new();
        write_summary(&ledger, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "user,free,available,credit_limit,debt,lent\n\
             alice,0,50,0,50,0\n\
             bob,200,150,0,0,50\n"
        );
    }
}

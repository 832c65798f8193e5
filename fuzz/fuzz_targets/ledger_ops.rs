#![no_main]

use arbitrary::Arbitrary;
use chronovyan_core::ResourceLedger;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Allocate { chronons: f64, aethel: f64 },
    Expend { chronons: f64, aethel: f64 },
    Borrow { chronons: f64, aethel: f64 },
    Repay { chronons: f64, aethel: f64 },
}

fuzz_target!(|ops: Vec<Op>| {
    let mut ledger = ResourceLedger::new();
    for op in ops {
        let before = ledger.clone();
        let result = match op {
            Op::Allocate { chronons, aethel } => ledger.allocate(chronons, aethel),
            Op::Expend { chronons, aethel } => ledger.expend(chronons, aethel),
            Op::Borrow { chronons, aethel } => ledger.borrow(chronons, aethel),
            Op::Repay { chronons, aethel } => ledger.repay(chronons, aethel),
        };

        if result.is_err() {
            assert_eq!(ledger, before);
        }
        assert!(ledger.chronons() >= 0.0 || ledger.chronons().is_nan());
        assert!(ledger.aethel() >= 0.0 || ledger.aethel().is_nan());
    }
});

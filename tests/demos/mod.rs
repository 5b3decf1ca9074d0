use crate::common::{pass_program, programs};

/// Ensures every demo program is accepted, and that each command in it produces an outcome.
#[test]
fn run_demos() {
	let mut count = 0;
	for path in programs("demos") {
		let source = std::fs::read_to_string(&path).unwrap();
		let commands = source.lines().filter(|line| line.trim_start().starts_with('\\')).count();
		let (outcomes, _) = pass_program(path);
		assert_eq!(outcomes.len(), commands);
		count += 1;
	}
	assert!(count > 0);
}

//! Basic example of using the subset-sum engine

use subsetsum_core::{BatchController, InstanceGenerator, SearchParams, Solver};

fn main() {
    // Generate an instance with a planted solution
    println!("Generating 1000 values with a planted 5-element solution...\n");
    let mut generator = InstanceGenerator::new();
    let instance = generator.generate();
    println!("Target: {}", instance.target);
    println!("Planted rows: {:?}\n", instance.planted);

    // Find one witness
    let solver = Solver::new();
    let numbers = instance.numbers();
    let params = SearchParams::new(instance.target as i64, 1, 5);
    match solver.find_one(&numbers, params) {
        Ok(result) => match result.combination {
            Some(combo) => println!("Found rows {:?} with values {:?}", combo.indices, combo.values),
            None => println!("No combination found"),
        },
        Err(err) => println!("Invalid input: {}", err),
    }

    // Enumerate every pair of a small input, a few nodes at a time
    println!("\n--- Batched enumeration ---\n");
    let mut controller = BatchController::new();
    let small = [1.0, 1.0, 1.0, 1.0];
    if let Err(err) = controller.init(&small, SearchParams::new(2, 2, 2), 10) {
        println!("Invalid input: {}", err);
        return;
    }
    loop {
        let record = match controller.advance(4) {
            Ok(record) => record,
            Err(err) => {
                println!("Search error: {}", err);
                break;
            }
        };
        for combo in &record.new_results {
            println!("  rows {:?}", combo.indices);
        }
        println!(
            "progress {:.1}% ({} nodes, {} found)",
            record.progress * 100.0,
            record.nodes_explored,
            record.total_found
        );
        if record.finished {
            break;
        }
    }
}

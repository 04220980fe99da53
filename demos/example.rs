use replication_planner::*;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Replication Capacity Planner - Example Usage\n");

    // Create a sample topology
    let topology = create_sample_topology();

    if let Err(e) = topology.validate() {
        eprintln!("Topology is invalid: {}", e);
        return;
    }

    for config in [GlobalConfig::asynchronous(), GlobalConfig::synchronous().with_concurrency(15)] {
        println!(
            "=== {:?} delivery ({} ms overhead, {} channels per interface) ===",
            config.integration_pattern, config.avg_middleware_response_time_ms, config.concurrency
        );

        let planner = Planner::new(config);
        match planner.run_checked(&topology) {
            Ok(result) => {
                println!("{}\n", result.summary());
                print_routes(&result);
                print_cluster_health(&result);
            }
            Err(e) => {
                eprintln!("Failed to estimate topology: {}", e);
            }
        }
    }
}

fn create_sample_topology() -> Topology {
    let mut topology = Topology::sample();

    // A fourth object with a narrow target interface to show packet splitting
    topology.add_data_object(DataObject::new("4", "Pricing Conditions", 2_000_000, 500, 0.8));
    topology.add_target(
        TargetSystem::new("t4", "c2", "Pricing Engine", 1200.0)
            .with_target_packet_size(100)
            .with_ingress_limit(120.0),
    );
    topology.add_mapping(Mapping::active("4", "t4"));
    topology.add_mapping(Mapping::inactive("4", "t1"));

    topology
}

fn print_routes(result: &SimulationResult) {
    println!("Routes:");
    for route in &result.routes {
        let mut flags = Vec::new();
        if route.is_throttled {
            flags.push("throttled");
        }
        if route.is_thread_bound {
            flags.push("thread-bound");
        }

        println!(
            "  {} -> {}: split x{}, in {:.1} RPS ({:.0} rec/s), out {:.0} rec/s, queue {} packets / {:.1} MB, done in {} {}",
            route.object_name,
            route.target_name,
            route.split_factor,
            route.effective_inbound_rps,
            route.inbound_throughput_records_per_sec,
            route.outbound_records_per_sec,
            route.max_queue_depth_packets,
            route.max_queue_storage_mb,
            format_duration(route.completion_time_secs),
            if flags.is_empty() { String::new() } else { format!("[{}]", flags.join(", ")) }
        );
    }
    println!();
}

fn print_cluster_health(result: &SimulationResult) {
    println!("Cluster Health:");
    for health in &result.cluster_health {
        let status = if health.is_breached() { "✗" } else { "✓" };
        println!(
            "  {} {}: threads {}/{}, queues {}/{}, storage {:.1}/{:.1} MB (peak {:.0}%)",
            status,
            health.cluster_name,
            health.used_threads,
            health.max_threads,
            health.active_queues,
            health.max_queues,
            health.total_storage_used_mb,
            health.max_storage_mb,
            health.utilization().max_utilization() * 100.0
        );
        for breach in health.breaches() {
            println!("      {}", breach.description());
        }
    }
    println!();
}

// ==========================================
// 收集调度集成测试
// ==========================================
// 职责: 验证 预测 → 调度 的组合行为以及整体不变量
// 场景: 新建收集员、容量约束、市场卸货、溢出期限、流水线直连
// ==========================================


use cauldron_aps::config::{DispatchConfig, EngineConfig};
use cauldron_aps::domain::{
    resolve_agent_capacity, AgentInfo, DispatchStopReason, RouteLegType, TransportGraph,
    VesselForecast,
};
use cauldron_aps::engine::{AnalysisPipeline, DispatchInput, DispatchPlan, DispatchScheduler};
use chrono::Duration;
use std::collections::HashSet;
use test_helpers::*;

// ==========================================
// 测试辅助函数
// ==========================================

fn schedule(
    config: DispatchConfig,
    forecasts: &[VesselForecast],
    graph: &TransportGraph,
    markets: &[String],
    capacity: f64,
) -> DispatchPlan {
    DispatchScheduler::new(config).schedule(&DispatchInput {
        forecasts,
        graph,
        market_nodes: markets,
        agent_capacity: capacity,
        simulation_start: t0(),
    })
}

/// 三只坩埚 + 一个市场的网络
fn create_test_network() -> (TransportGraph, Vec<String>) {
    let mut edges = Vec::new();
    edges.extend(two_way("cauldron_001", "market_001", 10.0));
    edges.extend(two_way("cauldron_002", "market_001", 6.0));
    edges.extend(two_way("cauldron_003", "market_001", 12.0));
    edges.extend(two_way("cauldron_001", "cauldron_002", 4.0));
    edges.extend(two_way("cauldron_002", "cauldron_003", 5.0));
    let graph = TransportGraph::from_edges(&edges);
    let markets = graph.find_market_nodes(&HashSet::from([
        "cauldron_001".to_string(),
        "cauldron_002".to_string(),
        "cauldron_003".to_string(),
    ]));
    (graph, markets)
}

fn minutes_of(d: Duration) -> f64 {
    d.num_milliseconds() as f64 / 60_000.0
}

// ==========================================
// 新建收集员
// ==========================================

#[test]
fn test_spawned_agent_collects_to_safe_level() {
    // 90/100，注入 2/分钟，无收集员 → 在坩埚处新建，收集 65
    let (graph, markets) = create_test_network();
    let forecasts = vec![create_test_forecast("cauldron_001", 90.0, 100.0, 2.0)];
    let config = DispatchConfig {
        horizon_min: 30.0,
        ..DispatchConfig::default()
    };

    let plan = schedule(config, &forecasts, &graph, &markets, 100.0);

    assert_eq!(plan.agents.len(), 1);
    let agent = &plan.agents[0];
    assert_eq!(agent.agent_id, 1);
    assert_eq!(agent.start_node, "cauldron_001");
    assert_eq!(agent.route.len(), 1);

    let leg = &agent.route[0];
    assert_eq!(leg.leg_type, RouteLegType::Collect);
    assert!((leg.amount - 65.0).abs() < 1e-9);
    assert_eq!(leg.travel_min, 0.0);
    assert_eq!(leg.start, t0() + Duration::seconds(30));
    assert_eq!(leg.end, at_min(33.0));
    assert_eq!(leg.overflow_deadline, Some(at_min(5.0)));

    assert_eq!(plan.stop_reason, DispatchStopReason::HorizonReached);
    assert!(plan.unscheduled_vessels.is_empty());
}

#[test]
fn test_spawned_collection_capped_by_capacity() {
    let (graph, markets) = create_test_network();
    let forecasts = vec![create_test_forecast("cauldron_001", 90.0, 100.0, 2.0)];
    let config = DispatchConfig {
        horizon_min: 30.0,
        ..DispatchConfig::default()
    };

    let plan = schedule(config, &forecasts, &graph, &markets, 40.0);

    let route = &plan.agents[0].route;
    assert_eq!(route.len(), 2);
    assert!((route[0].amount - 40.0).abs() < 1e-9);

    // 满载 → 最近市场卸货
    let unload = &route[1];
    assert_eq!(unload.leg_type, RouteLegType::MarketUnload);
    assert_eq!(unload.node_id, "market_001");
    assert!((unload.amount - 40.0).abs() < 1e-9);
    assert_eq!(unload.travel_min, 10.0);
    assert_eq!(unload.start, route[0].end + Duration::minutes(10));
    assert_eq!(unload.end, unload.start + Duration::minutes(15));
    assert_eq!(plan.agents[0].current_node, "market_001");
}

// ==========================================
// 全天不变量
// ==========================================

#[test]
fn test_full_day_invariants() {
    cauldron_aps::logging::init_test();
    let (graph, markets) = create_test_network();
    let forecasts = vec![
        create_test_forecast("cauldron_001", 300.0, 1000.0, 1.2),
        create_test_forecast("cauldron_002", 700.0, 800.0, 0.8),
        create_test_forecast("cauldron_003", 900.0, 1200.0, 1.5),
    ];
    let config = DispatchConfig::default();
    let capacity = 250.0;

    let plan = schedule(config.clone(), &forecasts, &graph, &markets, capacity);

    assert!(!plan.agents.is_empty());
    assert!(plan.total_collected() > 0.0);
    assert!(plan.iterations <= config.max_iterations);

    let ids: Vec<u32> = plan.agents.iter().map(|a| a.agent_id).collect();
    let expected: Vec<u32> = (1..=plan.agents.len() as u32).collect();
    assert_eq!(ids, expected, "收集员ID从 1 连续递增");

    for agent in &plan.agents {
        assert!(agent.remaining_capacity >= 0.0);

        // 自上次卸货以来的收集量不超过容量
        let mut load = 0.0;
        for leg in &agent.route {
            match leg.leg_type {
                RouteLegType::Collect => {
                    load += leg.amount;
                    assert!(load <= capacity + 1e-6, "收集员 {} 超载", agent.agent_id);
                }
                RouteLegType::MarketUnload => {
                    assert!((leg.amount - load).abs() < 1e-6);
                    load = 0.0;
                }
            }
        }

        // 时间单调
        for pair in agent.route.windows(2) {
            assert!(pair[0].start <= pair[0].end);
            assert!(pair[0].end <= pair[1].start);
        }

        // 复用的收集员在 溢出时间 - 安全余量 之前到达
        let margin = Duration::milliseconds((config.safety_margin_min * 60_000.0) as i64);
        for leg in agent.route.iter().filter(|l| l.leg_type == RouteLegType::Collect).skip(1) {
            let deadline = leg.overflow_deadline.expect("collect leg carries deadline");
            let arrival = leg.start - Duration::milliseconds((config.service_setup_min * 60_000.0) as i64);
            assert!(arrival <= deadline - margin);
        }

        // 收集时长 = 收集量 / 排液速率（排液速率取注入速率）
        for leg in agent.route.iter().filter(|l| l.leg_type == RouteLegType::Collect) {
            let fill = forecasts
                .iter()
                .find(|f| f.vessel_id == leg.node_id)
                .map(|f| f.fill_rate_per_min)
                .unwrap();
            let duration = minutes_of(leg.end - leg.start);
            assert!((duration - leg.amount / fill).abs() < 0.01);
        }
    }

    // 所有收集都落在模拟窗口内的溢出期限上
    let horizon_end = t0() + Duration::minutes(config.horizon_min as i64);
    for leg in plan.agents.iter().flat_map(|a| a.route.iter()) {
        if let Some(deadline) = leg.overflow_deadline {
            assert!(deadline <= horizon_end);
        }
    }
}

#[test]
fn test_vessels_without_capacity_or_fill_are_excluded() {
    let (graph, markets) = create_test_network();
    let mut no_capacity = create_test_forecast("cauldron_002", 50.0, 100.0, 1.0);
    no_capacity.max_volume = None;
    let mut no_fill = create_test_forecast("cauldron_003", 50.0, 100.0, 1.0);
    no_fill.fill_rate_per_min = 0.0;
    let forecasts = vec![no_capacity, no_fill];

    let plan = schedule(DispatchConfig::default(), &forecasts, &graph, &markets, 100.0);
    assert!(plan.agents.is_empty());
    assert_eq!(plan.iterations, 0);
    assert_eq!(plan.stop_reason, DispatchStopReason::QueueExhausted);
    assert!(plan.unscheduled_vessels.is_empty());
}

#[test]
fn test_overflowing_vessel_keeps_being_serviced() {
    // 已超过上限且容量不足以降到上限以下 → 持续重排，直到迭代上限
    let (graph, markets) = create_test_network();
    let forecasts = vec![
        create_test_forecast("cauldron_001", 150.0, 100.0, 2.0),
        create_test_forecast("cauldron_002", 10.0, 100.0, 0.5),
    ];
    let config = DispatchConfig {
        horizon_min: 60.0,
        max_iterations: 20,
        ..DispatchConfig::default()
    };

    let plan = schedule(config, &forecasts, &graph, &markets, 20.0);

    let c1_collects = plan
        .agents
        .iter()
        .flat_map(|a| a.route.iter())
        .filter(|l| l.node_id == "cauldron_001" && l.leg_type == RouteLegType::Collect)
        .count();
    assert_eq!(c1_collects, 20);
    assert_eq!(plan.stop_reason, DispatchStopReason::IterationCapHit);
    assert_eq!(plan.unscheduled_vessels, vec!["cauldron_002".to_string()]);
}

// ==========================================
// 流水线直连调度
// ==========================================

#[test]
fn test_pipeline_forecasts_feed_scheduler() {
    let mut all = readings("cauldron_001", &[(0.0, 100.0), (10.0, 100.0), (20.0, 40.0), (30.0, 60.0)]);
    all.extend(readings("cauldron_002", &[(0.0, 10.0), (10.0, 20.0), (20.0, 30.0), (30.0, 40.0)]));
    let vessels = vec![
        create_test_vessel("cauldron_001", 200.0),
        create_test_vessel("cauldron_002", 100.0),
    ];
    let config = EngineConfig::default();
    let analysis = AnalysisPipeline::new(&config).run(all, &[], &vessels);

    let mut edges = two_way("cauldron_001", "market_001", 10.0);
    edges.extend(two_way("cauldron_002", "market_001", 5.0));
    let graph = TransportGraph::from_edges(&edges);
    let markets = vec!["market_001".to_string()];
    let agents = vec![
        AgentInfo { agent_id: "courier_001".to_string(), capacity: Some(100.0) },
        AgentInfo { agent_id: "courier_002".to_string(), capacity: None },
    ];
    let capacity = resolve_agent_capacity(&agents, config.dispatch.fallback_capacity);
    assert_eq!(capacity, 100.0);

    let plan = schedule(config.dispatch.clone(), &analysis.forecasts, &graph, &markets, capacity);

    // cauldron_002 溢出更早（60 分钟），先被服务
    let first = &plan.agents[0];
    assert_eq!(first.start_node, "cauldron_002");
    assert_eq!(first.route[0].node_id, "cauldron_002");
    assert_eq!(first.route[0].overflow_deadline, Some(at_min(60.0)));

    // cauldron_001 的排液速率 8/分钟 高于注入速率，收集时长按 8 计算
    let c1_leg = plan
        .agents
        .iter()
        .flat_map(|a| a.route.iter())
        .find(|l| l.node_id == "cauldron_001" && l.leg_type == RouteLegType::Collect)
        .unwrap();
    assert!((minutes_of(c1_leg.end - c1_leg.start) - c1_leg.amount / 8.0).abs() < 0.01);
}

// ==========================================
// 坩埚监控调度系统 - 运输网络领域模型
// ==========================================
// 职责: 有向加权图 (权重 = 行驶分钟) + 最短路 + 市场节点识别
// 红线: 不可达目的地视为无穷远，永不被选中
// ==========================================

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet};

// ==========================================
// Edge - 有向边
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub travel_time_min: f64, // 行驶时间 (分钟)，非负
}

// ==========================================
// TransportGraph - 运输网络
// ==========================================
// 单次运行内静态
#[derive(Debug, Clone, Default)]
pub struct TransportGraph {
    adjacency: HashMap<String, Vec<(String, f64)>>,
    nodes: BTreeSet<String>,
    degree: HashMap<String, usize>, // 出度 + 入度
}

impl TransportGraph {
    /// 由边列表构建图
    ///
    /// 同一对节点的重复边保留，最短路自动取较小者
    pub fn from_edges(edges: &[Edge]) -> Self {
        let mut graph = Self::default();
        for edge in edges {
            graph
                .adjacency
                .entry(edge.from.clone())
                .or_default()
                .push((edge.to.clone(), edge.travel_time_min));
            graph.nodes.insert(edge.from.clone());
            graph.nodes.insert(edge.to.clone());
            *graph.degree.entry(edge.from.clone()).or_insert(0) += 1;
            *graph.degree.entry(edge.to.clone()).or_insert(0) += 1;
        }
        graph
    }

    pub fn contains_node(&self, node: &str) -> bool {
        self.nodes.contains(node)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// 所有节点（按名称排序）
    pub fn nodes(&self) -> impl Iterator<Item = &String> {
        self.nodes.iter()
    }

    pub fn degree(&self, node: &str) -> usize {
        self.degree.get(node).copied().unwrap_or(0)
    }

    /// 最短行驶时间（Dijkstra）
    ///
    /// # 返回
    /// - 起终点相同: 0.0（即使节点不在图中）
    /// - 不可达或节点不存在: f64::INFINITY
    pub fn shortest_travel_time(&self, from: &str, to: &str) -> f64 {
        if from == to {
            return 0.0;
        }
        if !self.contains_node(from) || !self.contains_node(to) {
            return f64::INFINITY;
        }

        let mut best: HashMap<&str, f64> = HashMap::new();
        let mut heap = BinaryHeap::new();
        best.insert(from, 0.0);
        heap.push(Frontier { cost: 0.0, node: from });

        while let Some(Frontier { cost, node }) = heap.pop() {
            if node == to {
                return cost;
            }
            if cost > best.get(node).copied().unwrap_or(f64::INFINITY) {
                continue;
            }
            let Some(neighbors) = self.adjacency.get(node) else {
                continue;
            };
            for (next, weight) in neighbors {
                let next_cost = cost + weight;
                if next_cost < best.get(next.as_str()).copied().unwrap_or(f64::INFINITY) {
                    best.insert(next.as_str(), next_cost);
                    heap.push(Frontier { cost: next_cost, node: next.as_str() });
                }
            }
        }

        f64::INFINITY
    }

    /// 识别市场节点
    ///
    /// 规则（顺序执行，命中即返回）:
    /// 1) 名称包含 "market"（不区分大小写）的所有节点，按名称排序
    /// 2) 度数最高且不是坩埚的节点（同度数按名称）
    /// 3) 任意节点（名称最小者）
    /// 4) 空图 → 空列表
    pub fn find_market_nodes(&self, vessel_ids: &HashSet<String>) -> Vec<String> {
        let by_name: Vec<String> = self
            .nodes
            .iter()
            .filter(|n| n.to_lowercase().contains("market"))
            .cloned()
            .collect();
        if !by_name.is_empty() {
            return by_name;
        }

        let fallback = self
            .nodes
            .iter()
            .filter(|n| !vessel_ids.contains(*n))
            .max_by(|a, b| {
                self.degree(a)
                    .cmp(&self.degree(b))
                    // 同度数时名称较小者优先
                    .then_with(|| b.cmp(a))
            });
        if let Some(node) = fallback {
            return vec![node.clone()];
        }

        self.nodes.iter().next().cloned().into_iter().collect()
    }

    /// 距离最近的可达市场
    ///
    /// # 返回
    /// - Some((市场节点, 行驶分钟)): 严格更近者优先，同距离取列表中靠前者
    /// - None: 没有可达市场
    pub fn nearest_market(&self, from: &str, markets: &[String]) -> Option<(String, f64)> {
        let mut best: Option<(String, f64)> = None;
        for market in markets {
            let travel = self.shortest_travel_time(from, market);
            if !travel.is_finite() {
                continue;
            }
            if best.as_ref().map_or(true, |(_, t)| travel < *t) {
                best = Some((market.clone(), travel));
            }
        }
        best
    }
}

// ==========================================
// Dijkstra 前沿（最小堆包装）
// ==========================================
struct Frontier<'a> {
    cost: f64,
    node: &'a str,
}

impl Ord for Frontier<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap 是最大堆，反转得到最小代价优先
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(self.node))
    }
}

impl PartialOrd for Frontier<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for Frontier<'_> {}

impl PartialEq for Frontier<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

use std::collections::VecDeque;

/// A unit-capacity flow network over a dense capacity matrix, solved with
/// Ford-Fulkerson using BFS augmenting paths.
///
/// The validator uses this for bipartite matching of dice against board
/// tiles or word positions.
#[derive(Debug)]
pub struct FlowNetwork {
    vertices: usize,
    capacity: Vec<u8>,
    flow: Vec<i32>,
}

impl FlowNetwork {
    pub fn new(vertices: usize) -> FlowNetwork {
        FlowNetwork {
            vertices,
            capacity: vec![0; vertices * vertices],
            flow: vec![0; vertices * vertices],
        }
    }

    /// Add a unit-capacity edge from `u` to `v`.
    pub fn add_edge(&mut self, u: usize, v: usize) {
        self.capacity[u * self.vertices + v] = 1;
    }

    fn residual(&self, u: usize, v: usize) -> i32 {
        let n = self.vertices;
        self.capacity[u * n + v] as i32 - self.flow[u * n + v] + self.flow[v * n + u]
    }

    /// Compute the maximum flow from `source` to `sink`.
    pub fn max_flow(&mut self, source: usize, sink: usize) -> usize {
        let n = self.vertices;
        self.flow.iter_mut().for_each(|f| *f = 0);

        let mut total = 0usize;
        loop {
            // find an augmenting path
            let mut prev: Vec<Option<usize>> = vec![None; n];
            let mut seen = vec![false; n];
            seen[source] = true;
            let mut queue = VecDeque::new();
            queue.push_back(source);

            while let Some(u) = queue.pop_front() {
                if seen[sink] {
                    break;
                }
                for v in 0..n {
                    if !seen[v] && self.residual(u, v) > 0 {
                        seen[v] = true;
                        prev[v] = Some(u);
                        queue.push_back(v);
                    }
                }
            }
            if !seen[sink] {
                break;
            }

            // bottleneck along the path
            let mut bottleneck = i32::MAX;
            let mut v = sink;
            while let Some(u) = prev[v] {
                bottleneck = bottleneck.min(self.residual(u, v));
                v = u;
            }

            // push flow
            let mut v = sink;
            while let Some(u) = prev[v] {
                self.flow[u * n + v] += bottleneck;
                v = u;
            }
            total += bottleneck as usize;
        }
        total
    }
}

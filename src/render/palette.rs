//! Per-call agent colors.

use crate::models::AgentId;
use plotters::style::RGBColor;
use std::collections::BTreeMap;

/// The ten-color "tab10" cycle.
pub const TAB10: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// Agent to color mapping, built fresh for every chart.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    colors: BTreeMap<AgentId, RGBColor>,
}

impl Palette {
    /// Assign colors in ascending agent order, cycling through [`TAB10`].
    pub fn for_agents<I>(agents: I) -> Self
    where
        I: IntoIterator<Item = AgentId>,
    {
        let mut colors = BTreeMap::new();
        let mut sorted: Vec<AgentId> = agents.into_iter().collect();
        sorted.sort();
        sorted.dedup();
        for (index, agent) in sorted.into_iter().enumerate() {
            colors.insert(agent, TAB10[index % TAB10.len()]);
        }
        Self { colors }
    }

    /// Color of an agent; agents outside the palette get the first color.
    pub fn color(&self, agent: AgentId) -> RGBColor {
        self.colors.get(&agent).copied().unwrap_or(TAB10[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors_follow_agent_order() {
        let palette = Palette::for_agents([AgentId(9), AgentId(2), AgentId(5), AgentId(2)]);
        assert_eq!(palette.color(AgentId(2)), TAB10[0]);
        assert_eq!(palette.color(AgentId(5)), TAB10[1]);
        assert_eq!(palette.color(AgentId(9)), TAB10[2]);
    }

    #[test]
    fn test_colors_cycle() {
        let palette = Palette::for_agents((0..12).map(AgentId));
        assert_eq!(palette.color(AgentId(10)), TAB10[0]);
        assert_eq!(palette.color(AgentId(11)), TAB10[1]);
    }

    #[test]
    fn test_independent_palettes() {
        let first = Palette::for_agents([AgentId(1), AgentId(2)]);
        let second = Palette::for_agents([AgentId(2)]);
        assert_eq!(first.color(AgentId(2)), TAB10[1]);
        assert_eq!(second.color(AgentId(2)), TAB10[0]);
    }
}

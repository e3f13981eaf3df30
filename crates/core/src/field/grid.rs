use std::collections::HashMap;

use super::particle::Particle;

/// Uniform-cell spatial hash over particle indices.
///
/// This is a derived index: it is rebuilt from scratch every tick and never
/// patched incrementally.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f64,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    pub fn cell_of(&self, x: f64, y: f64) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, index: usize, x: f64, y: f64) {
        let key = self.cell_of(x, y);
        self.cells.entry(key).or_default().push(index);
    }

    /// Clear and re-insert every particle at its current cell.
    pub fn rebuild(&mut self, particles: &[Particle]) {
        self.clear();
        for (i, p) in particles.iter().enumerate() {
            self.insert(i, p.x, p.y);
        }
    }

    /// Indices in the 3×3 block of cells around `(x, y)`.
    pub fn neighbors(&self, x: f64, y: f64) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = self.cell_of(x, y);
        (cx.saturating_sub(1)..=cx.saturating_add(1))
            .flat_map(move |gx| {
                (cy.saturating_sub(1)..=cy.saturating_add(1)).map(move |gy| (gx, gy))
            })
            .filter_map(|key| self.cells.get(&key))
            .flat_map(|cell| cell.iter().copied())
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_cover_adjacent_cells_only() {
        let mut grid = SpatialGrid::new(150.0);
        grid.insert(0, 10.0, 10.0); // (0, 0)
        grid.insert(1, 160.0, 160.0); // (1, 1)
        grid.insert(2, 310.0, 10.0); // (2, 0)
        grid.insert(3, -5.0, -5.0); // (-1, -1)

        let mut near: Vec<usize> = grid.neighbors(10.0, 10.0).collect();
        near.sort_unstable();
        assert_eq!(near, vec![0, 1, 3]);
    }

    #[test]
    fn rebuild_replaces_previous_contents() {
        let mut grid = SpatialGrid::new(150.0);
        grid.insert(9, 1000.0, 1000.0);
        let particles = [Particle {
            x: 20.0,
            y: 20.0,
            vx: 0.0,
            vy: 0.0,
            radius: 1.0,
            opacity: 1.0,
            target_opacity: 1.0,
        }];
        grid.rebuild(&particles);
        assert_eq!(grid.occupied_cells(), 1);
        assert_eq!(grid.neighbors(1000.0, 1000.0).count(), 0);
    }
}

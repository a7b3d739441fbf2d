//! Truss model container and the direct stiffness solution pipeline.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};
use petgraph::graph::{EdgeIndex, Graph, NodeIndex};

use crate::config::SolverConfig;
use crate::errors::{
    AnalysisError, ConstructionError, InstabilityError, ModelIncompleteError, TrussEditError,
};
use crate::geometry::{Displacement, Force, Point};
use crate::member::Member;
use crate::node::Node;
use crate::results::{AnalysisResults, MemberResult, NodeResult};
use crate::stability::check_stability;

/// Progress of a [`TrussSystem`] through [`TrussSystem::solve`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SolveState {
    /// Inputs may still be edited.
    #[default]
    Unsolved,
    /// The global stiffness matrix and force vector are built.
    Assembled,
    /// The free degrees of freedom and the reduced system are extracted.
    Partitioned,
    /// Displacements, reactions and member forces are available.
    Solved,
}

/// Matrices and vectors produced by a successful analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// Global stiffness matrix, `2N × 2N`.
    pub global_stiffness: DMatrix<f64>,
    /// Global applied force vector, length `2N`.
    pub global_forces: DVector<f64>,
    /// Free degrees of freedom in ascending order.
    pub free_dofs: Vec<usize>,
    /// Stiffness restricted to the free degrees of freedom.
    pub reduced_stiffness: DMatrix<f64>,
    /// Applied forces restricted to the free degrees of freedom.
    pub reduced_forces: DVector<f64>,
    /// Displacement of every degree of freedom; restrained entries are zero.
    pub displacements: DVector<f64>,
    /// `K·U − F` at every degree of freedom.
    pub reactions: DVector<f64>,
    /// 2-norm condition number of the reduced stiffness matrix.
    pub condition_number: f64,
}

/// Container for a planar pin-jointed truss model.
///
/// Nodes and members are numbered from 1 in insertion order and are never
/// renumbered. Once [`solve`](Self::solve) succeeds the model is frozen; build a
/// new system for a new analysis.
#[derive(Clone, Debug, Default)]
pub struct TrussSystem {
    /// Nodes as graph vertices and members as graph edges.
    graph: Graph<Node, Member>,
    /// Accumulated applied force per global degree of freedom.
    loads: BTreeMap<usize, f64>,
    /// Thresholds used during the analysis.
    config: SolverConfig,
    /// Current position in the solution pipeline.
    state: SolveState,
    /// Results of the last successful analysis.
    solution: Option<Solution>,
}

impl TrussSystem {
    /// Create an empty truss with the default solver configuration.
    ///
    /// # Examples
    /// ```
    /// use truss2d::TrussSystem;
    ///
    /// let truss = TrussSystem::new();
    /// assert_eq!(truss.node_count(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SolverConfig::default())
    }

    /// Create an empty truss with explicit solver settings.
    #[must_use]
    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            graph: Graph::new(),
            loads: BTreeMap::new(),
            config,
            state: SolveState::Unsolved,
            solution: None,
        }
    }

    /// Solver settings in use.
    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Current position in the solution pipeline.
    #[must_use]
    pub fn state(&self) -> SolveState {
        self.state
    }

    /// Return the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of members.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Add a node and return its one-based identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::AlreadySolved`] once the system has been solved.
    ///
    /// # Examples
    /// ```
    /// use truss2d::{point, TrussSystem};
    ///
    /// let mut truss = TrussSystem::new();
    /// let pin = truss.add_node(point(0.0, 0.0), true, true).expect("editable");
    /// let free = truss.add_node(point(3.0, 0.0), false, false).expect("editable");
    /// assert_eq!((pin, free), (1, 2));
    /// ```
    pub fn add_node(
        &mut self,
        position: Point,
        restrain_x: bool,
        restrain_y: bool,
    ) -> Result<usize, TrussEditError> {
        self.ensure_editable()?;
        let id = self.graph.node_count() + 1;
        let mut node = Node::new(id, position);
        node.set_restraint(restrain_x, restrain_y);
        self.graph.add_node(node);
        Ok(id)
    }

    /// Replace the restraint flags of a node.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::UnknownNode`] when `node` is not part of this truss
    /// and [`TrussEditError::AlreadySolved`] once the system has been solved.
    pub fn set_restraint(
        &mut self,
        node: usize,
        restrain_x: bool,
        restrain_y: bool,
    ) -> Result<(), TrussEditError> {
        self.ensure_editable()?;
        let index = self
            .node_index(node)
            .ok_or(TrussEditError::UnknownNode(node))?;
        self.graph[index].set_restraint(restrain_x, restrain_y);
        Ok(())
    }

    /// Connect two nodes with a new member and return its one-based identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::Construction`] when an endpoint is unknown, the
    /// endpoints coincide, or `elastic_modulus` or `area` is not strictly positive,
    /// and [`TrussEditError::AlreadySolved`] once the system has been solved.
    pub fn add_member(
        &mut self,
        node_i: usize,
        node_j: usize,
        elastic_modulus: f64,
        area: f64,
    ) -> Result<usize, TrussEditError> {
        self.ensure_editable()?;
        let id = self.graph.edge_count() + 1;
        let start = self
            .node_index(node_i)
            .ok_or(ConstructionError::UnknownNode {
                member: id,
                node: node_i,
            })?;
        let end = self
            .node_index(node_j)
            .ok_or(ConstructionError::UnknownNode {
                member: id,
                node: node_j,
            })?;
        let member = Member::new(
            id,
            &self.graph[start],
            &self.graph[end],
            elastic_modulus,
            area,
        )?;
        self.graph.add_edge(start, end, member);
        Ok(id)
    }

    /// Add a point load to a node. Repeated loads on the same node accumulate.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::UnknownNode`] when `node` is not part of this truss,
    /// [`TrussEditError::NonFiniteLoad`] when a component is NaN or infinite, and
    /// [`TrussEditError::AlreadySolved`] once the system has been solved.
    pub fn add_load(
        &mut self,
        node: usize,
        force_x: f64,
        force_y: f64,
    ) -> Result<(), TrussEditError> {
        self.ensure_editable()?;
        let index = self
            .node_index(node)
            .ok_or(TrussEditError::UnknownNode(node))?;
        if !force_x.is_finite() || !force_y.is_finite() {
            return Err(TrussEditError::NonFiniteLoad {
                node,
                force_x,
                force_y,
            });
        }
        let (dof_x, dof_y) = {
            let node = &self.graph[index];
            (node.dof_x(), node.dof_y())
        };
        *self.loads.entry(dof_x).or_insert(0.0) += force_x;
        *self.loads.entry(dof_y).or_insert(0.0) += force_y;
        Ok(())
    }

    /// Accumulated applied force per global degree of freedom.
    #[must_use]
    pub fn loads(&self) -> &BTreeMap<usize, f64> {
        &self.loads
    }

    /// Total applied load at a node.
    #[must_use]
    pub fn applied_load(&self, node: usize) -> Option<Force> {
        let node = self.node(node)?;
        let component = |dof: usize| self.loads.get(&dof).copied().unwrap_or(0.0);
        Some(Force::new(component(node.dof_x()), component(node.dof_y())))
    }

    /// Look up a node by identifier.
    #[must_use]
    pub fn node(&self, id: usize) -> Option<&Node> {
        self.node_index(id).map(|index| &self.graph[index])
    }

    /// Iterate over the nodes in identifier order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Look up a member by identifier.
    #[must_use]
    pub fn member(&self, id: usize) -> Option<&Member> {
        id.checked_sub(1)
            .and_then(|index| self.graph.edge_weight(EdgeIndex::new(index)))
    }

    /// Iterate over the members in identifier order.
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.graph.edge_weights()
    }

    /// Matrices and vectors of the last successful analysis.
    #[must_use]
    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    /// Global stiffness matrix after a successful analysis.
    #[must_use]
    pub fn global_stiffness(&self) -> Option<&DMatrix<f64>> {
        self.solution.as_ref().map(|solution| &solution.global_stiffness)
    }

    /// Sorted free degrees of freedom after a successful analysis.
    #[must_use]
    pub fn free_dofs(&self) -> Option<&[usize]> {
        self.solution
            .as_ref()
            .map(|solution| solution.free_dofs.as_slice())
    }

    /// Reduced stiffness matrix after a successful analysis.
    #[must_use]
    pub fn reduced_stiffness(&self) -> Option<&DMatrix<f64>> {
        self.solution
            .as_ref()
            .map(|solution| &solution.reduced_stiffness)
    }

    /// Reduced force vector after a successful analysis.
    #[must_use]
    pub fn reduced_forces(&self) -> Option<&DVector<f64>> {
        self.solution.as_ref().map(|solution| &solution.reduced_forces)
    }

    /// Full displacement vector after a successful analysis.
    #[must_use]
    pub fn displacements(&self) -> Option<&DVector<f64>> {
        self.solution.as_ref().map(|solution| &solution.displacements)
    }

    /// Condition number of the reduced stiffness matrix after a successful analysis.
    #[must_use]
    pub fn condition_number(&self) -> Option<f64> {
        self.solution
            .as_ref()
            .map(|solution| solution.condition_number)
    }

    /// Analyse the truss under the applied loads.
    ///
    /// Calling this again on a solved system returns immediately. On failure every
    /// solved quantity is cleared and the system returns to
    /// [`SolveState::Unsolved`].
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ModelIncomplete`] when the model has no nodes or no
    /// members and [`AnalysisError::Instability`] when the structure is fully
    /// locked, a mechanism, or numerically singular.
    pub fn solve(&mut self) -> Result<(), AnalysisError> {
        if self.state == SolveState::Solved {
            debug!("truss already solved");
            return Ok(());
        }
        match self.run_analysis() {
            Ok(solution) => {
                info!(
                    "solved truss with {} nodes and {} members (condition number {:e})",
                    self.node_count(),
                    self.member_count(),
                    solution.condition_number
                );
                self.solution = Some(solution);
                self.state = SolveState::Solved;
                Ok(())
            }
            Err(error) => {
                warn!("truss analysis failed: {error}");
                self.invalidate();
                Err(error)
            }
        }
    }

    /// Collect per-node and per-member results after a successful analysis.
    #[must_use]
    pub fn results(&self) -> Option<AnalysisResults> {
        let solution = self.solution.as_ref()?;
        let tolerance = self.config.zero_force_tolerance;
        let nodes = self
            .nodes()
            .map(|node| {
                let load = self.applied_load(node.id()).unwrap_or_default();
                NodeResult::new(node, load)
            })
            .collect();
        let members = self
            .members()
            .map(|member| MemberResult::new(member, tolerance))
            .collect();
        Some(AnalysisResults {
            condition_number: solution.condition_number,
            free_dofs: solution.free_dofs.clone(),
            nodes,
            members,
        })
    }

    /// Run the pipeline from assembly to member force recovery.
    fn run_analysis(&mut self) -> Result<Solution, AnalysisError> {
        if self.graph.node_count() == 0 {
            return Err(ModelIncompleteError::NoNodes.into());
        }
        if self.graph.edge_count() == 0 {
            return Err(ModelIncompleteError::NoMembers.into());
        }

        let global_stiffness = self.build_stiffness_matrix();
        let global_forces = self.build_load_vector();
        self.state = SolveState::Assembled;

        let free_dofs = self.collect_free_dofs();
        let (reduced_stiffness, reduced_forces) =
            Self::partition(&global_stiffness, &global_forces, &free_dofs);
        self.state = SolveState::Partitioned;
        debug!(
            "partitioned {} degrees of freedom into {} free",
            global_forces.len(),
            free_dofs.len()
        );

        let condition_number = check_stability(
            &free_dofs,
            &reduced_stiffness,
            self.config.max_condition_number,
        )?;
        let free_displacements = Self::solve_reduced(&reduced_stiffness, &reduced_forces)?;

        let mut displacements = DVector::zeros(global_forces.len());
        for (idx, &dof) in free_dofs.iter().enumerate() {
            displacements[dof] = free_displacements[idx];
        }
        self.store_node_displacements(&displacements);

        let reactions = &global_stiffness * &displacements - &global_forces;
        self.store_node_reactions(&reactions);

        self.update_member_forces();

        Ok(Solution {
            global_stiffness,
            global_forces,
            free_dofs,
            reduced_stiffness,
            reduced_forces,
            displacements,
            reactions,
            condition_number,
        })
    }

    /// Refuse edits to a solved model.
    fn ensure_editable(&self) -> Result<(), TrussEditError> {
        if self.state == SolveState::Solved {
            Err(TrussEditError::AlreadySolved)
        } else {
            Ok(())
        }
    }

    /// Graph index of a node identifier.
    fn node_index(&self, id: usize) -> Option<NodeIndex> {
        let index = NodeIndex::new(id.checked_sub(1)?);
        self.graph.node_weight(index).map(|_| index)
    }

    /// Reset solved quantities after a failed analysis.
    fn invalidate(&mut self) {
        for node in self.graph.node_weights_mut() {
            node.reset_results();
        }
        for member in self.graph.edge_weights_mut() {
            member.reset_results();
        }
        self.solution = None;
        self.state = SolveState::Unsolved;
    }

    /// Assemble the global stiffness matrix by scatter-adding element matrices.
    fn build_stiffness_matrix(&mut self) -> DMatrix<f64> {
        let dof = self.node_count() * 2;
        let mut matrix = DMatrix::zeros(dof, dof);
        for edge in self.graph.edge_indices() {
            let Some((start, end)) = self.graph.edge_endpoints(edge) else {
                continue;
            };
            let node_i = self.graph[start].clone();
            let node_j = self.graph[end].clone();
            let member = &mut self.graph[edge];
            let local = member.compute_element_stiffness(&node_i, &node_j);
            let dof_map = member.global_dofs();

            for (row_local, global_row) in dof_map.iter().enumerate() {
                for (col_local, global_col) in dof_map.iter().enumerate() {
                    matrix[(*global_row, *global_col)] += local[(row_local, col_local)];
                }
            }
        }
        debug!(
            "assembled {dof}x{dof} global stiffness from {} members",
            self.member_count()
        );
        matrix
    }

    /// Assemble the global nodal load vector.
    fn build_load_vector(&self) -> DVector<f64> {
        let mut load = DVector::zeros(self.node_count() * 2);
        for (&dof, &force) in &self.loads {
            load[dof] = force;
        }
        load
    }

    /// Free degrees of freedom: free X in node order, then free Y in node order,
    /// sorted ascending.
    fn collect_free_dofs(&self) -> Vec<usize> {
        let mut free: Vec<usize> = self
            .nodes()
            .filter(|node| !node.restrain_x())
            .map(Node::dof_x)
            .chain(
                self.nodes()
                    .filter(|node| !node.restrain_y())
                    .map(Node::dof_y),
            )
            .collect();
        free.sort_unstable();
        free
    }

    /// Restrict the global system to the free degrees of freedom.
    fn partition(
        stiffness: &DMatrix<f64>,
        load: &DVector<f64>,
        free_dofs: &[usize],
    ) -> (DMatrix<f64>, DVector<f64>) {
        let reduced_stiffness = stiffness.select_rows(free_dofs).select_columns(free_dofs);
        let reduced_forces = load.select_rows(free_dofs);
        (reduced_stiffness, reduced_forces)
    }

    /// Solve the reduced system with a dense LU factorisation.
    fn solve_reduced(
        stiffness: &DMatrix<f64>,
        load: &DVector<f64>,
    ) -> Result<DVector<f64>, InstabilityError> {
        let solution = stiffness
            .clone()
            .lu()
            .solve(load)
            .ok_or(InstabilityError::Singular)?;
        if solution.iter().any(|value| !value.is_finite()) {
            return Err(InstabilityError::Singular);
        }
        Ok(solution)
    }

    /// Persist solved displacements on the nodes.
    fn store_node_displacements(&mut self, displacements: &DVector<f64>) {
        for node in self.graph.node_weights_mut() {
            let displacement =
                Displacement::new(displacements[node.dof_x()], displacements[node.dof_y()]);
            node.set_displacement(displacement);
        }
    }

    /// Persist reactions on the nodes.
    fn store_node_reactions(&mut self, reactions: &DVector<f64>) {
        for node in self.graph.node_weights_mut() {
            let reaction = Force::new(reactions[node.dof_x()], reactions[node.dof_y()]);
            node.set_reaction(reaction);
        }
    }

    /// Recover the axial force of every member from the solved displacements.
    fn update_member_forces(&mut self) {
        for edge in self.graph.edge_indices() {
            let Some((start, end)) = self.graph.edge_endpoints(edge) else {
                continue;
            };
            let node_i = self.graph[start].clone();
            let node_j = self.graph[end].clone();
            self.graph[edge].recover_internal_force(&node_i, &node_j);
        }
    }
}

use crate::domain::model::ProjectTree;
use crate::utils::error::{PatchError, Result};

/// Order in which subprojects are configured.
///
/// Every subproject other than `anchor` evaluates after it, and explicit
/// `evaluation_depends_on` edges are honoured. Ties keep declaration order.
/// Self edges are ignored.
pub fn evaluation_order(tree: &ProjectTree, anchor: Option<&str>) -> Result<Vec<String>> {
    let names = tree.names();
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let index_of = |name: &str| -> Result<usize> {
        names
            .iter()
            .position(|n| *n == name)
            .ok_or_else(|| PatchError::UnknownProject {
                name: name.to_string(),
            })
    };

    // dependencies[i] holds the projects that must evaluate before i
    let mut dependencies: Vec<Vec<usize>> = vec![Vec::new(); names.len()];
    let anchor_index = anchor.map(index_of).transpose()?;

    for (i, subproject) in tree.subprojects.iter().enumerate() {
        if let Some(a) = anchor_index {
            if a != i {
                dependencies[i].push(a);
            }
        }
        for dep in &subproject.evaluation_depends_on {
            let d = index_of(dep.trim_start_matches(':'))?;
            if d != i && !dependencies[i].contains(&d) {
                dependencies[i].push(d);
            }
        }
    }

    let mut done = vec![false; names.len()];
    let mut order = Vec::with_capacity(names.len());
    while order.len() < names.len() {
        let next = (0..names.len())
            .find(|&i| !done[i] && dependencies[i].iter().all(|&d| done[d]));
        match next {
            Some(i) => {
                done[i] = true;
                order.push(names[i].to_string());
            }
            None => {
                let projects = (0..names.len())
                    .filter(|&i| !done[i])
                    .map(|i| names[i].to_string())
                    .collect();
                return Err(PatchError::EvaluationCycle { projects });
            }
        }
    }

    Ok(order)
}

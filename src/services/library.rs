//! Workout library: the definitions sessions are started from

use std::{collections::HashSet, fs, path::Path};

use anyhow::Context;
use tracing::{info, warn};

use super::WorkoutProvider;
use crate::state::{ExerciseItem, WorkoutDefinition};

/// In-memory list of workout definitions
#[derive(Debug, Clone, Default)]
pub struct WorkoutLibrary {
    workouts: Vec<WorkoutDefinition>,
}

impl WorkoutLibrary {
    pub fn new(workouts: Vec<WorkoutDefinition>) -> Self {
        let mut seen = HashSet::new();
        for workout in &workouts {
            if !seen.insert(workout.id.as_str()) {
                warn!("Duplicate workout id {}, only the first is reachable", workout.id);
            }
            if workout.ordered_exercise_items.is_empty() {
                warn!("Workout {} has no exercises and cannot be started", workout.id);
            }
        }
        Self { workouts }
    }

    /// Load a JSON array of workout definitions
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read workouts from {}", path.display()))?;
        let workouts: Vec<WorkoutDefinition> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse workouts in {}", path.display()))?;
        info!("Loaded {} workouts from {}", workouts.len(), path.display());
        Ok(Self::new(workouts))
    }

    /// A small sample set so the service is usable without a workouts file
    pub fn builtin() -> Self {
        fn item(id: &str, name: &str, sets: u32, reps: u32, weight: f64, rest: u64) -> ExerciseItem {
            ExerciseItem {
                id: id.to_string(),
                name: name.to_string(),
                planned_sets: sets,
                planned_reps: reps,
                planned_weight: weight,
                rest_seconds: rest,
            }
        }

        Self::new(vec![
            WorkoutDefinition {
                id: "treino-a".to_string(),
                name: "Treino A - Peito e Tríceps".to_string(),
                ordered_exercise_items: vec![
                    item("supino-reto", "Supino reto", 4, 10, 60.0, 90),
                    item("supino-inclinado", "Supino inclinado com halteres", 3, 12, 22.0, 60),
                    item("triceps-corda", "Tríceps na corda", 3, 12, 25.0, 60),
                ],
            },
            WorkoutDefinition {
                id: "treino-b".to_string(),
                name: "Treino B - Costas e Bíceps".to_string(),
                ordered_exercise_items: vec![
                    item("puxada-frente", "Puxada na frente", 4, 10, 55.0, 90),
                    item("remada-curvada", "Remada curvada", 4, 10, 50.0, 90),
                    item("rosca-direta", "Rosca direta", 3, 12, 14.0, 60),
                ],
            },
            WorkoutDefinition {
                id: "treino-c".to_string(),
                name: "Treino C - Pernas".to_string(),
                ordered_exercise_items: vec![
                    item("agachamento", "Agachamento livre", 4, 8, 80.0, 120),
                    item("leg-press", "Leg press", 4, 12, 160.0, 90),
                    item("panturrilha", "Panturrilha em pé", 4, 15, 40.0, 45),
                ],
            },
        ])
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }
}

impl WorkoutProvider for WorkoutLibrary {
    fn workout(&self, id: &str) -> Option<WorkoutDefinition> {
        self.workouts.iter().find(|w| w.id == id).cloned()
    }

    fn workouts(&self) -> Vec<WorkoutDefinition> {
        self.workouts.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_workouts_are_startable() {
        let library = WorkoutLibrary::builtin();
        assert_eq!(library.len(), 3);
        for workout in library.workouts() {
            assert!(workout.validate().is_ok(), "{} should be valid", workout.id);
        }
        assert_eq!(library.workout("treino-c").unwrap().ordered_exercise_items.len(), 3);
        assert!(library.workout("treino-z").is_none());
    }

    #[test]
    fn loads_workouts_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"quick","name":"Quick","orderedExerciseItems":[
                {{"id":"burpee","plannedSets":3,"plannedReps":15,"restSeconds":30}}
            ]}}]"#
        )
        .unwrap();

        let library = WorkoutLibrary::load(file.path()).unwrap();
        assert_eq!(library.len(), 1);
        let quick = library.workout("quick").unwrap();
        assert_eq!(quick.ordered_exercise_items[0].rest_seconds, 30);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = WorkoutLibrary::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse workouts"));
    }

    #[test]
    fn first_duplicate_wins() {
        let first = WorkoutDefinition {
            id: "dup".to_string(),
            name: "First".to_string(),
            ordered_exercise_items: Vec::new(),
        };
        let second = WorkoutDefinition { name: "Second".to_string(), ..first.clone() };
        let library = WorkoutLibrary::new(vec![first, second]);
        assert_eq!(library.workout("dup").unwrap().name, "First");
    }
}

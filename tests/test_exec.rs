#[cfg(test)]
mod test_exec {
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::sync::Arc;

    use approx::assert_relative_eq;
    use ndarray::{arr1, ArrayD};
    use pretty_assertions::assert_eq;
    use sedml_utils::prelude::*;

    const TIMES: [f64; 5] = [0.0, 2.5, 5.0, 7.5, 10.0];

    fn load_doc() -> SedDocument {
        load_sed_document("tests/data/sedml_doc.json").expect("Failed to load document")
    }

    fn options(out: &std::path::Path) -> ExecOptions {
        ExecOptionsBuilder::default()
            .working_dir("tests/data")
            .base_out_path(out)
            .report_formats(vec![ReportFormat::Json])
            .plot_formats(Vec::<PlotFormat>::new())
            .build()
            .unwrap()
    }

    /// Simulates first order decay of `A` with rate 0.5 on the time course grid.
    fn decay(_: &Task, _: &ResolvedModel, variables: &[Variable]) -> Result<VariableResults, TaskError> {
        Ok(variables
            .iter()
            .map(|var| {
                let values: ArrayD<f64> = if var.symbol.is_some() {
                    arr1(&TIMES).into_dyn()
                } else {
                    arr1(&TIMES.map(|t| 10.0 * (-0.5 * t).exp())).into_dyn()
                };
                (var.id.clone(), values)
            })
            .collect())
    }

    fn simple_doc(task_ids: &[&str], report_lengths: &[usize]) -> SedDocument {
        let model = Arc::new(
            ModelBuilder::default()
                .id("model")
                .source("model.xml")
                .build()
                .unwrap(),
        );
        let sim: Arc<Simulation> = Arc::new(
            SteadyStateSimulationBuilder::default()
                .id("sim")
                .build()
                .unwrap()
                .into(),
        );

        let tasks: Vec<Arc<AbstractTask>> = task_ids
            .iter()
            .map(|id| {
                Arc::new(
                    TaskBuilder::default()
                        .id(*id)
                        .model(model.clone())
                        .simulation(sim.clone())
                        .build()
                        .unwrap()
                        .into(),
                )
            })
            .collect();

        let data_generators: Vec<Arc<DataGenerator>> = report_lengths
            .iter()
            .enumerate()
            .map(|(idx, _)| {
                Arc::new(
                    DataGeneratorBuilder::default()
                        .id(format!("dg_{idx}"))
                        .to_variables(
                            VariableBuilder::default()
                                .id(format!("var_{idx}"))
                                .target(format!("/sbml/model/listOfSpecies/species[@id='S{idx}']"))
                                .task(tasks[idx % tasks.len()].clone())
                                .build()
                                .unwrap(),
                        )
                        .math(format!("var_{idx}"))
                        .build()
                        .unwrap(),
                )
            })
            .collect();

        let report = ReportBuilder::default()
            .id("report")
            .data_sets(
                data_generators
                    .iter()
                    .map(|dg| {
                        DataSetBuilder::default()
                            .id(format!("ds_{}", dg.id))
                            .label(dg.id.clone())
                            .data_generator(dg.clone())
                            .build()
                            .unwrap()
                    })
                    .collect::<Vec<_>>(),
            )
            .build()
            .unwrap();

        SedDocumentBuilder::default()
            .to_models(model)
            .to_simulations(sim)
            .tasks(tasks)
            .data_generators(data_generators)
            .to_outputs(Output::from(report))
            .build()
            .unwrap()
    }

    /// Executes the sample document and checks the shaped report, the data
    /// generator math and the skipped plot.
    #[test]
    fn test_exec_document() {
        // ARRANGE
        let doc = load_doc();
        let dir = tempfile::tempdir().unwrap();
        let mut executor = decay;

        // ACT
        let results = exec_sed_doc(&mut executor, &doc, &options(dir.path())).unwrap();

        // ASSERT
        let report = &results.outputs["report"];
        assert_eq!(report.labels, vec!["time", "A", "log A"]);
        assert_eq!(report.values.shape(), &[3, 5]);
        let time: Vec<f64> = report.get("time").unwrap().iter().copied().collect();
        assert_eq!(time, TIMES.to_vec());

        let log_a = report.get("log A").unwrap();
        for (value, t) in log_a.iter().zip(TIMES) {
            assert_relative_eq!(*value, 2.0 * (10.0f64.ln() - 0.5 * t), epsilon = 1e-10);
        }

        assert_eq!(
            results.warnings,
            vec![ExecWarning::OutputNotSupported {
                output: "plot".to_string(),
                kind: "Plot2D",
            }]
        );
        assert!(!results.outputs.contains_key("plot"));
        assert!(dir.path().join("report.json").exists());
    }

    /// Reads the document through the reader when given a path, and nests reports
    /// under the relative output path.
    #[test]
    fn test_exec_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(dir.path());
        opts.rel_out_path = Some("sim.sedml".to_string());
        opts.report_formats = Some(vec![ReportFormat::Json, ReportFormat::Csv]);

        let mut executor = decay;
        let results = exec_sed_doc(
            &mut executor,
            PathBuf::from("tests/data/sedml_doc.json"),
            &opts,
        )
        .unwrap();

        assert_eq!(results.outputs.len(), 1);
        assert!(dir.path().join("sim.sedml/report.json").exists());
        assert!(dir.path().join("sim.sedml/report.csv").exists());

        let written: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("sim.sedml/report.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(written[1]["label"], "A");
        assert_eq!(written[1]["shape"], serde_json::json!([5]));
    }

    #[test]
    fn test_missing_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut executor = decay;
        let err = exec_sed_doc(
            &mut executor,
            PathBuf::from("tests/data/missing.json"),
            &options(dir.path()),
        )
        .unwrap_err();

        assert!(matches!(err, ExecError::Read(IOError::FileNotFound { .. })));
    }

    /// Tasks run in ascending id order regardless of their order in the document.
    #[test]
    fn test_task_order() {
        let doc = simple_doc(&["b", "a"], &[1, 1]);
        let order = RefCell::new(Vec::new());

        let mut executor =
            |task: &Task, _: &ResolvedModel, variables: &[Variable]| -> Result<VariableResults, TaskError> {
                order.borrow_mut().push(task.id.clone());
                Ok(variables
                    .iter()
                    .map(|var| (var.id.clone(), arr1(&[1.0]).into_dyn()))
                    .collect())
            };

        let dir = tempfile::tempdir().unwrap();
        exec_sed_doc(&mut executor, &doc, &options(dir.path())).unwrap();

        assert_eq!(order.into_inner(), vec!["a", "b"]);
    }

    #[test]
    fn test_report_shape_mismatch() {
        let doc = simple_doc(&["task"], &[3, 4]);
        let mut executor =
            |_: &Task, _: &ResolvedModel, variables: &[Variable]| -> Result<VariableResults, TaskError> {
                Ok(variables
                    .iter()
                    .map(|var| {
                        let len = if var.id == "var_0" { 3 } else { 4 };
                        (var.id.clone(), ArrayD::zeros(vec![len]))
                    })
                    .collect())
            };

        let dir = tempfile::tempdir().unwrap();
        let err = exec_sed_doc(&mut executor, &doc, &options(dir.path())).unwrap_err();

        match err {
            ExecError::ShapeMismatch { report, shapes } => {
                assert_eq!(report, "report");
                assert_eq!(shapes, vec![vec![3], vec![4]]);
            }
            other => panic!("Unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_result() {
        let doc = simple_doc(&["task"], &[1]);
        let mut executor =
            |_: &Task, _: &ResolvedModel, _: &[Variable]| -> Result<VariableResults, TaskError> {
                Ok(VariableResults::new())
            };

        let dir = tempfile::tempdir().unwrap();
        let err = exec_sed_doc(&mut executor, &doc, &options(dir.path())).unwrap_err();

        assert!(matches!(
            err,
            ExecError::MissingResult { ref task, ref variable } if task == "task" && variable == "var_0"
        ));
    }

    #[test]
    fn test_task_failure() {
        let doc = simple_doc(&["task"], &[1]);
        let mut executor =
            |_: &Task, _: &ResolvedModel, _: &[Variable]| -> Result<VariableResults, TaskError> {
                Err("solver diverged".into())
            };

        let dir = tempfile::tempdir().unwrap();
        let err = exec_sed_doc(&mut executor, &doc, &options(dir.path())).unwrap_err();

        assert!(matches!(err, ExecError::Task { ref task, .. } if task == "task"));
        assert!(err.to_string().contains("solver diverged"));
    }

    #[test]
    fn test_repeated_task_unsupported() {
        let mut doc = simple_doc(&["task"], &[1]);
        let repeated = RepeatedTaskBuilder::default()
            .id("repeat")
            .to_sub_tasks(SubTask {
                order: Some(1),
                task: doc.tasks[0].clone(),
            })
            .build()
            .unwrap();
        doc.tasks.push(Arc::new(repeated.into()));

        let mut executor = decay;
        let dir = tempfile::tempdir().unwrap();
        let err = exec_sed_doc(&mut executor, &doc, &options(dir.path())).unwrap_err();

        assert!(matches!(err, ExecError::UnsupportedFeature(ref what) if what.contains("repeat")));
    }

    /// Model changes are applied to a temporary copy that exists while tasks run and
    /// is removed afterwards. The document's model source is left untouched.
    #[test]
    fn test_model_changes_applied() {
        let doc = load_doc();
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(dir.path());
        opts.apply_model_changes = true;

        let seen: RefCell<Option<PathBuf>> = RefCell::new(None);
        let mut executor =
            |task: &Task, model: &ResolvedModel, variables: &[Variable]| -> Result<VariableResults, TaskError> {
                let path = model.path().expect("Model should be a local file");
                assert!(model.changes_applied);
                assert!(path.exists());

                let content = std::fs::read_to_string(&path)?;
                assert!(content.contains(r#"<parameter id="k" value="0.25" constant="true"/>"#));

                *seen.borrow_mut() = Some(path.to_path_buf());
                decay(task, model, variables)
            };

        exec_sed_doc(&mut executor, &doc, &opts).unwrap();

        let temp_path = seen.into_inner().expect("Task should have run");
        assert!(!temp_path.exists());
        assert_eq!(doc.models[0].source, "model.xml");

        let original = std::fs::read_to_string("tests/data/model.xml").unwrap();
        assert!(original.contains(r#"value="0.5""#));
    }

    #[test]
    fn test_temp_models_removed_on_failure() {
        let doc = load_doc();
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(dir.path());
        opts.apply_model_changes = true;

        let seen: RefCell<Option<PathBuf>> = RefCell::new(None);
        let mut executor =
            |_: &Task, model: &ResolvedModel, _: &[Variable]| -> Result<VariableResults, TaskError> {
                *seen.borrow_mut() = model.path().map(|path| path.to_path_buf());
                Err("simulation failed".into())
            };

        assert!(exec_sed_doc(&mut executor, &doc, &opts).is_err());

        let temp_path = seen.into_inner().expect("Task should have run");
        assert!(!temp_path.exists());
    }

    #[test]
    fn test_model_change_errors() {
        let mut doc = load_doc();
        let mut model = doc.models[0].as_ref().clone();
        model.changes = vec![ModelAttributeChangeBuilder::default()
            .target("/sbml:sbml/sbml:model/sbml:listOfParameters/sbml:parameter[@id='missing']/@value")
            .new_value("1")
            .build()
            .unwrap()
            .into()];
        doc.models[0] = Arc::new(model);

        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(dir.path());
        opts.apply_model_changes = true;

        let mut executor = decay;
        let err = exec_sed_doc(&mut executor, &doc, &opts).unwrap_err();

        assert!(matches!(
            err,
            ExecError::ModelChange {
                ref model,
                source: ModelChangeError::TargetNotFound(_)
            } if model == "model"
        ));
    }
}

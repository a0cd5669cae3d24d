use std::collections::HashSet;
use tempfile::TempDir;
use vacancy_stats::core::normalizer::{CleanRow, VacancyReader};
use vacancy_stats::core::partition::{partition_file_name, YearPartitions, DEFAULT_PARTITION_DIR};
use vacancy_stats::{CurrencyTable, LocalStorage};

const DATA: &str = "\u{feff}name,key_skills,salary_from,salary_to,salary_currency,area_name,published_at
<b>Python</b>   Developer,\"Python\r\nDjango\",100,200,RUR,Москва,2022-01-01T10:00:00+0300
QA,Selenium,100,200,KZT,Казань,2021-05-01T10:00:00+0300
Ops,,100,200,RUR,Казань,2021-05-01T10:00:00+0300
Analyst,SQL,100,200,XYZ,Москва,2023-02-01T10:00:00+0300
PM,\"Jira\nConfluence\",300,400,EUR,Тверь,2022-02-01T10:00:00+0300
";

fn source_rows() -> anyhow::Result<Vec<CleanRow>> {
    let mut reader = VacancyReader::new(DATA.as_bytes(), CurrencyTable::standard())?;
    let mut rows = Vec::new();
    while let Some(row) = reader.next_clean_row() {
        rows.push(row?);
    }
    Ok(rows)
}

#[tokio::test]
async fn test_partitions_reassemble_the_normalized_rows() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path());

    let mut reader = VacancyReader::new(DATA.as_bytes(), CurrencyTable::standard())?;
    let partitions = YearPartitions::collect(&mut reader)?;
    let written = partitions.write_all(&storage, DEFAULT_PARTITION_DIR).await?;

    assert_eq!(
        written,
        vec![
            format!("{}/{}", DEFAULT_PARTITION_DIR, partition_file_name(2022)),
            format!("{}/{}", DEFAULT_PARTITION_DIR, partition_file_name(2021)),
            format!("{}/{}", DEFAULT_PARTITION_DIR, partition_file_name(2023)),
        ]
    );

    let mut reassembled = Vec::new();
    for path in &written {
        let data = std::fs::read(temp_dir.path().join(path))?;
        let mut reader = VacancyReader::new(data.as_slice(), CurrencyTable::standard())?;
        assert_eq!(reader.header().columns(), partitions.header());

        while let Some(row) = reader.next_clean_row() {
            reassembled.push(row?);
        }
    }

    let expected = source_rows()?;
    assert_eq!(reassembled.len(), expected.len());
    assert_eq!(
        reassembled.into_iter().collect::<HashSet<_>>(),
        expected.into_iter().collect::<HashSet<_>>()
    );
    Ok(())
}

#[tokio::test]
async fn test_partition_files_hold_cleaned_values() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path());

    let mut reader = VacancyReader::new(DATA.as_bytes(), CurrencyTable::standard())?;
    let partitions = YearPartitions::collect(&mut reader)?;
    partitions.write_all(&storage, "by_year").await?;

    let content = std::fs::read_to_string(temp_dir.path().join("by_year").join(partition_file_name(2022)))?;
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("name,key_skills,salary_from,salary_to,salary_currency,area_name,published_at")
    );
    assert!(content.contains("Python Developer,\"Python\nDjango\""));
    assert!(!content.contains("<b>"));
    assert!(!content.contains('\r'));
    Ok(())
}

#[tokio::test]
async fn test_tag_only_cells_are_not_partitioned() -> anyhow::Result<()> {
    let data = "name,key_skills,salary_from,salary_to,salary_currency,area_name,published_at
Dev,<p></p>,1,2,RUR,Moscow,2020-01-01
QA,Selenium,1,2,RUR,Moscow,2020-01-01
";
    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path());

    let mut reader = VacancyReader::new(data.as_bytes(), CurrencyTable::standard())?;
    let partitions = YearPartitions::collect(&mut reader)?;
    assert_eq!(partitions.total_rows(), 1);
    assert_eq!(reader.counters().incomplete, 1);

    let written = partitions.write_all(&storage, DEFAULT_PARTITION_DIR).await?;
    let content = std::fs::read(temp_dir.path().join(&written[0]))?;
    let mut reread = VacancyReader::new(content.as_slice(), CurrencyTable::standard())?;
    let mut rows = 0;
    while let Some(row) = reread.next_clean_row() {
        row?;
        rows += 1;
    }
    assert_eq!(rows, partitions.total_rows());
    Ok(())
}

use clap::Parser;

/// Applies the edits listed in a spreadsheet to a survey export (QSF) file.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A configuration file in JSON format. The other flags override the values
    /// it contains.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The base survey document (.qsf or .json).
    #[clap(short, long, value_parser)]
    pub qsf: Option<String>,

    /// (file path) The edit table, as an Excel workbook (.xlsx) or a CSV file.
    #[clap(short, long, value_parser)]
    pub edits: Option<String>,

    /// (xlsx or csv) The type of the edit table. By default, it is inferred from the extension of the file.
    #[clap(long, value_parser)]
    pub edits_type: Option<String>,

    /// (default Survey_Edits) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (file path or 'stdout') Where to write the updated document. By default, a file named
    /// Updated_Survey_<date>_<time>.qsf is created next to the base document.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the expected updated document. If provided, qsfedit will
    /// check that its output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}

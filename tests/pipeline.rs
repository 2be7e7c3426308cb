use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use sales_dashboard::data::filter::{reconcile_subcategories, subcategory_options};
use sales_dashboard::data::{
    load_reader, DashboardView, DateRangeInput, FilterCriteria, LoadOptions, RowPolicy,
};

/// A small superstore extract, Latin-1 encoded like the reference file.
fn superstore_extract() -> Vec<u8> {
    let mut out = b"Row ID,Order ID,Order Date,Ship Date,Ship Mode,Customer ID,Customer Name,Segment,Country,City,State,Postal Code,Region,Product ID,Category,Sub-Category,Product Name,Sales,Quantity,Discount,Profit\n".to_vec();
    let rows: [&[u8]; 7] = [
        b"1,CA-2016-152156,11/8/2016,11/11/2016,Second Class,CG-12520,Claire Gute,Consumer,United States,Henderson,Kentucky,42420,South,FUR-BO-10001798,Furniture,Bookcases,Bush Somerset Collection Bookcase,261.96,2,0,41.9136\n",
        b"2,CA-2016-152156,11/8/2016,11/11/2016,Second Class,CG-12520,Claire Gute,Consumer,United States,Henderson,Kentucky,42420,South,FUR-CH-10000454,Furniture,Chairs,\"Hon Deluxe Fabric Upholstered Stacking Chairs, Rounded Back\",731.94,3,0,219.582\n",
        b"3,CA-2016-138688,6/12/2016,6/16/2016,Second Class,DV-13045,Darrin Van Huff,Corporate,United States,Los Angeles,California,90036,West,OFF-LA-10000240,Office Supplies,Labels,Self-Adhesive Address Labels for Typewriters by Universal,14.62,2,0,6.8714\n",
        b"4,US-2015-108966,10/11/2015,10/18/2015,Standard Class,SO-20335,Sean O'Donnell,Consumer,United States,Fort Lauderdale,Florida,33311,South,FUR-TA-10000577,Furniture,Tables,Bretford CR4500 Series Slim Rectangular Table,957.5775,5,0.45,-383.031\n",
        b"5,CA-2016-161389,12/5/2016,12/10/2016,Standard Class,IM-15070,Irene Maddox,Consumer,United States,Seattle,Washington,98103,West,OFF-BI-10003656,Office Supplies,Binders,Fellowes PB200 Plastic Comb Binding Machine,407.976,3,0.2,132.5922\n",
        b"6,CA-2016-117590,12/8/2016,12/10/2016,First Class,GH-14485,Gene Hale,Corporate,United States,Richardson,Texas,75080,Central,TEC-PH-10004977,Technology,Phones,Caf\xe9 GE 30524EE4,1097.544,7,0.2,123.4737\n",
        b"7,CA-2016-117591,13/45/2016,12/10/2016,First Class,GH-14485,Gene Hale,Corporate,United States,Richardson,Texas,75080,Central,TEC-PH-10004977,Technology,Phones,Broken date row,10,1,0,1\n",
    ];
    for r in rows {
        out.extend_from_slice(r);
    }
    out
}

fn names(set: &BTreeSet<String>) -> Vec<&str> {
    set.iter().map(String::as_str).collect()
}

#[test]
fn load_filter_aggregate_end_to_end() {
    let data = superstore_extract();
    let ds = load_reader(&data[..], &LoadOptions::default()).unwrap();

    assert_eq!(ds.len(), 6);
    assert_eq!(ds.skipped_count(), 1);
    assert_eq!(ds.skipped[0].line, 8);
    assert_eq!(ds.records[5].product_name, "Café GE 30524EE4");
    assert_eq!(
        ds.records[1].product_name,
        "Hon Deluxe Fabric Upholstered Stacking Chairs, Rounded Back"
    );

    let criteria = FilterCriteria::for_year(2016).with_regions(["South", "West"]);
    let view = DashboardView::compute(&ds, &criteria);

    assert_eq!(view.row_count(), 4);
    assert_eq!(view.metrics.total_orders, 3);
    let expected_total = 261.96 + 731.94 + 14.62 + 407.976;
    assert!((view.metrics.total_sales - expected_total).abs() < 1e-9);
    assert_eq!(
        view.metrics.average_order_value,
        view.metrics.total_sales / 3.0
    );

    let months: Vec<String> = view.monthly_sales.iter().map(|m| m.month.to_string()).collect();
    assert_eq!(months, vec!["2016-06", "2016-11", "2016-12"]);

    let top: Vec<&str> = view.top_products.iter().map(|p| p.short_name.as_str()).collect();
    assert_eq!(
        top,
        vec![
            "Hon Deluxe Fabric Up...",
            "Fellowes PB200 Plast...",
            "Bush Somerset Collec...",
            "Self-Adhesive Addres...",
        ]
    );

    let regions: Vec<&str> = view.region_sales.iter().map(|r| r.region.as_str()).collect();
    assert_eq!(regions, vec!["South", "West"]);
    let share_sum: f64 = view.region_sales.iter().map(|r| r.share).sum();
    assert!((share_sum - 1.0).abs() < 1e-12);
}

#[test]
fn date_range_narrows_within_year() {
    let ds = load_reader(&superstore_extract()[..], &LoadOptions::default()).unwrap();
    let d = |m, day| chrono::NaiveDate::from_ymd_opt(2016, m, day).unwrap();

    let criteria = FilterCriteria::for_year(2016)
        .with_regions(["South", "West", "Central"])
        .with_date_range(DateRangeInput::new(d(12, 1), d(12, 31)));
    let view = DashboardView::compute(&ds, &criteria);
    assert_eq!(view.row_count(), 2);
    assert_eq!(view.monthly_sales.len(), 1);
}

#[test]
fn subcategory_options_respect_categories() {
    let ds = load_reader(&superstore_extract()[..], &LoadOptions::default()).unwrap();

    let furniture = BTreeSet::from(["Furniture".to_string()]);
    assert_eq!(
        names(&subcategory_options(&ds, &furniture)),
        vec!["Bookcases", "Chairs", "Tables"]
    );

    let criteria = FilterCriteria::for_year(2016)
        .with_regions(["South"])
        .with_subcategories(["Chairs", "Phones"])
        .with_categories(["Furniture"]);
    let (pruned, dropped) = reconcile_subcategories(&ds, criteria);
    assert_eq!(names(&pruned.subcategories), vec!["Chairs"]);
    assert_eq!(names(&dropped), vec!["Phones"]);

    let view = DashboardView::compute(&ds, &pruned);
    assert_eq!(view.row_count(), 1);
}

#[test]
fn strict_load_rejects_bad_dates() {
    let options = LoadOptions {
        row_policy: RowPolicy::Strict,
        ..LoadOptions::default()
    };
    let err = load_reader(&superstore_extract()[..], &options).unwrap_err();
    assert!(err.to_string().contains("line 8"));
}
